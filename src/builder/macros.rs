//! Macros for declaring state tables.

/// Declare a module of named state numbers.
///
/// Generates one `StateNumber` constant per state, plus `MAX` (the highest
/// declared number) and `ALL` (every declared number, in declaration order).
///
/// # Example
///
/// ```
/// use statewire::state_numbers;
///
/// state_numbers! {
///     pub mod conn {
///         INIT = 1,
///         OPEN = 2,
///         CLOSING = 3,
///         FREE = 4,
///     }
/// }
///
/// assert_eq!(conn::OPEN, 2);
/// assert_eq!(conn::MAX, 4);
/// assert_eq!(conn::ALL, &[1, 2, 3, 4]);
/// ```
#[macro_export]
macro_rules! state_numbers {
    (
        $(#[$meta:meta])*
        $vis:vis mod $name:ident {
            $(
                $(#[$state_meta:meta])*
                $state:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis mod $name {
            $(
                $(#[$state_meta])*
                pub const $state: $crate::core::StateNumber = $value;
            )+

            /// Highest declared state number.
            pub const MAX: $crate::core::StateNumber = {
                let mut max = 0;
                $(
                    if $state > max {
                        max = $state;
                    }
                )+
                max
            };

            /// Every declared state number, in declaration order.
            pub const ALL: &[$crate::core::StateNumber] = &[$($state),+];
        }
    };
}

#[cfg(test)]
mod tests {
    state_numbers! {
        mod listener {
            INIT = 1,
            LISTENING = 2,
            FREE = 3,
        }
    }

    state_numbers! {
        mod scrambled {
            B = 2,
            C = 3,
            A = 1,
        }
    }

    #[test]
    fn constants_match_declared_numbers() {
        assert_eq!(listener::INIT, 1);
        assert_eq!(listener::LISTENING, 2);
        assert_eq!(listener::FREE, 3);
        assert_eq!(listener::ALL, &[1, 2, 3]);
    }

    #[test]
    fn max_ignores_declaration_order() {
        assert_eq!(scrambled::MAX, 3);
        assert_eq!(scrambled::ALL, &[2, 3, 1]);
    }
}
