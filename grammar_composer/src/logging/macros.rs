//! Logging macros.
//!
//! Context is written as `"key" => value` pairs; values only need `Display`.
//! Nothing is formatted unless the global logger exists and accepts the level.

#[doc(hidden)]
#[macro_export]
macro_rules! __emit_event {
    ($level:expr, $event:expr $(, $key:expr => $value:expr)*) => {
        if let Some(service) = $crate::logging::global_logger() {
            if service.enabled($level) {
                let event = $event;
                $(let event = event.with_context($key, format!("{}", $value));)*
                service.emit(event);
            }
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Error,
            $crate::logging::LogEvent::error($code, $message).with_span($span)
            $(, $key => $value)*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Error,
            $crate::logging::LogEvent::error($code, $message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Info,
            $crate::logging::LogEvent::success($code, $message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Info,
            $crate::logging::LogEvent::info($message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Warning,
            $crate::logging::LogEvent::warning(Some($code), $message)
            $(, $key => $value)*
        )
    };

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Warning,
            $crate::logging::LogEvent::warning(None, $message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__emit_event!(
            $crate::logging::LogLevel::Debug,
            $crate::logging::LogEvent::debug($message)
            $(, $key => $value)*
        )
    };
}

/// Success event with a `duration_ms` pair, skipped when performance events are off
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::config::performance_events() {
            $crate::log_success!(
                $code,
                $message,
                "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
                $(, $key => $value)*
            );
        }
    };
}
