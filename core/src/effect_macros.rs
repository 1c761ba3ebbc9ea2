//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, in
//! particular the cancellable fetches and debounce timers used by the
//! client features.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use haven_core::async_effect;
///
/// async_effect! {
///     let venue = data.get_venue(id).await;
///     Some(VenueDetailAction::VenueLoaded { venue })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use haven_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_millis(500),
///     action: SearchAction::DebounceElapsed { token }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Wrap an effect so it can be aborted by id
///
/// `cancel_in_flight: true` aborts whatever is still running under the same
/// id before the new effect starts.
///
/// # Example
///
/// ```rust,ignore
/// use haven_core::{cancellable, delay};
///
/// cancellable! {
///     id: SEARCH_DEBOUNCE,
///     cancel_in_flight: true,
///     effect: delay! {
///         duration: debounce,
///         action: SearchAction::DebounceElapsed { token }
///     }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        cancel_in_flight: $cancel:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            cancel_in_flight: $cancel,
            effect: ::std::boxed::Box::new($effect),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::{Effect, EffectId};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    enum TestAction {
        Loaded { value: i32 },
        DebounceElapsed,
    }

    const DEBOUNCE: EffectId = EffectId::new("test.debounce");

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_millis(500),
            action: TestAction::DebounceElapsed
        };

        assert!(matches!(effect, Effect::Delay { .. }));
    }

    #[test]
    fn test_cancellable_macro() {
        let effect = cancellable! {
            id: DEBOUNCE,
            cancel_in_flight: true,
            effect: delay! {
                duration: Duration::from_millis(500),
                action: TestAction::DebounceElapsed
            }
        };

        assert!(matches!(
            effect,
            Effect::Cancellable { id, cancel_in_flight: true, .. } if id == DEBOUNCE
        ));
    }
}
