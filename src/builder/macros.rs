//! Macros for declaring state and event enums.

#[doc(hidden)]
#[macro_export]
macro_rules! __label_enum {
    (
        $label_trait:path;
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $label_trait for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::builder::UnknownLabel;

            fn from_str(label: &str) -> ::std::result::Result<Self, Self::Err> {
                match label {
                    $($label => Ok(Self::$variant),)*
                    other => Err($crate::builder::UnknownLabel(other.to_string())),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(<Self as $label_trait>::name(self))
            }
        }
    };
}

/// Declare an enum of states, each with its display label.
///
/// Generates the `State` implementation, `FromStr` from the label,
/// `Display`, and an `ALL` constant.
///
/// # Example
///
/// ```
/// use stepflow::state_enum;
/// use stepflow::core::State;
///
/// state_enum! {
///     pub enum Step {
///         Idle => "IDLE",
///         Editing => "EDITING",
///     }
/// }
///
/// assert_eq!(Step::Editing.name(), "EDITING");
/// assert_eq!("IDLE".parse::<Step>().unwrap(), Step::Idle);
/// ```
#[macro_export]
macro_rules! state_enum {
    ($($body:tt)*) => {
        $crate::__label_enum!($crate::core::State; $($body)*);
    };
}

/// Declare an enum of events, each with the label it is triggered by.
///
/// # Example
///
/// ```
/// use stepflow::event_enum;
/// use stepflow::core::Event;
///
/// event_enum! {
///     pub enum Action {
///         Save => "save",
///         Discard => "discard",
///     }
/// }
///
/// assert_eq!(Action::Save.name(), "save");
/// assert!("publish".parse::<Action>().is_err());
/// ```
#[macro_export]
macro_rules! event_enum {
    ($($body:tt)*) => {
        $crate::__label_enum!($crate::core::Event; $($body)*);
    };
}
