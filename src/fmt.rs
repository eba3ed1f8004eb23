//! Indented, aligned rendering of decoded records.

/// Where [`Logger`] sends rendered lines.
#[derive(Debug, Clone)]
pub enum LogOutput {
    Log(log::Level),
    LogTarget(log::Level, String),
    StdOut,
    StdErr,
    #[cfg(feature = "log-to-file")]
    File(std::sync::Arc<parking_lot::Mutex<std::fs::File>>),
}

impl From<log::Level> for LogOutput {
    fn from(value: log::Level) -> Self {
        Self::Log(value)
    }
}

impl LogOutput {
    fn print(&self, line: &str) {
        match self {
            LogOutput::Log(level) => log::log!(*level, "{line}"),
            LogOutput::LogTarget(level, target) => log::log!(target: target, *level, "{line}"),
            LogOutput::StdOut => println!("{line}"),
            LogOutput::StdErr => eprintln!("{line}"),
            #[cfg(feature = "log-to-file")]
            LogOutput::File(file) => {
                use std::io::Write;

                let mut file = file.lock();
                if let Err(e) = writeln!(file, "{line}") {
                    log::error!("Failed to write history log line: {e}");
                }
            }
        }
    }
}

/// One line of a [`Loggable`]'s output: a title, an optional value and the
/// indentation level it is printed at.
#[derive(Debug, Clone, PartialEq)]
pub struct LogItem {
    level: usize,
    title: String,
    value: Option<String>,
}

impl LogItem {
    pub fn new<T: Into<String>, V: Into<String>>(level: usize, title: T, value: Option<V>) -> Self {
        Self {
            level,
            title: title.into(),
            value: value.map(Into::into),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

impl<T: ToString, V: ToString> From<(usize, T, V)> for LogItem {
    fn from((level, title, value): (usize, T, V)) -> Self {
        Self::new(level, title.to_string(), Some(value.to_string()))
    }
}

impl<T: ToString> From<(usize, T)> for LogItem {
    fn from((level, title): (usize, T)) -> Self {
        Self::new::<_, String>(level, title.to_string(), None)
    }
}

pub struct Logger;

impl Logger {
    pub fn log<T>(output: &LogOutput, loggable: &T)
    where
        T: Loggable,
    {
        Self::render(&loggable.as_log())
            .iter()
            .for_each(|line| output.print(line));
    }

    /// Render `items` into lines.
    ///
    /// The first item is a heading. Values of the remaining items are
    /// right-aligned against the other items at the same level.
    pub fn render(items: &[LogItem]) -> Vec<String> {
        let Some((heading, items)) = items.split_first() else {
            return Vec::new();
        };

        let align = |level: usize| {
            items
                .iter()
                .filter(|i| i.level == level && i.value().is_some())
                .map(|i| i.title.len())
                .max()
                .unwrap_or(0)
        };

        let mut lines = vec![heading.title.clone()];

        lines.extend(items.iter().map(|item| {
            let indent = " ".repeat(item.level * 2);
            let title = &item.title;

            match item.value() {
                Some(value) => {
                    let padding = " ".repeat(align(item.level) - title.len());
                    format!("{indent}{title}: {padding}{value}")
                }
                None => format!("{indent}{title}:"),
            }
        }));

        lines
    }
}

pub trait Loggable {
    fn as_log(&self) -> Vec<LogItem>;
}

#[macro_export]
macro_rules! log_vec {
    [$($msg:tt)*] => {
        $crate::to_log!(vec: $($msg)*)
    }
}

#[macro_export]
macro_rules! to_log {
    ([$($array:tt)*],) => {
        vec![$($array)*]
    };

    ([$($array:tt)*], ($level:literal, $title:expr, $value:expr)) => {
        $crate::to_log!([$($array)* ($level, $title, $value).into(),],)
    };

    ([$($array:tt)*], ($level:literal, $title:expr)) => {
        $crate::to_log!([$($array)* ($level, $title).into(),],)
    };

    ([$($array:tt)*], ($level:literal, $title:expr, $value:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($level, $title, $value).into(),], $($msg)*)
    };

    ([$($array:tt)*], ($level:literal, $title:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($level, $title).into(),], $($msg)*)
    };

    (vec: $($msg:tt)*) => {
        $crate::to_log!([], $($msg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_values_per_level() {
        let items: Vec<LogItem> = crate::log_vec![
            (0, "Record"),
            (1, "Type", "Bolus"),
            (1, "Programmed", "1.000 U"),
            (1, "Before"),
            (2, "Carb ratios", 2),
            (2, "Targets", 1),
        ];

        assert_eq!(
            Logger::render(&items),
            [
                "Record",
                "  Type:       Bolus",
                "  Programmed: 1.000 U",
                "  Before:",
                "    Carb ratios: 2",
                "    Targets:     1",
            ]
        );
    }

    #[test]
    fn empty_value_is_no_value() {
        let item: LogItem = (1, "Title", "").into();
        assert_eq!(item.value(), None);
        assert_eq!(item.level(), 1);

        assert!(Logger::render(&[]).is_empty());
    }
}
