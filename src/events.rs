use crate::ring::ItemIndex;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Input accepted by [`crate::ring::Carousel::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselEvent {
    DragStart,
    DragMove { delta_x: f64 },
    DragEnd { velocity_x: f64 },
    Select { index: ItemIndex },
    Dismiss,
    ViewportChanged { width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    Input(CarouselEvent),
    ConfigReload,
}

impl From<CarouselEvent> for AppEvent {
    fn from(event: CarouselEvent) -> Self {
        AppEvent::Input(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Verb {
    Start,
    #[strum(to_string = "drag", serialize = "move")]
    Drag,
    #[strum(to_string = "release", serialize = "end")]
    Release,
    Select,
    #[strum(to_string = "dismiss", serialize = "close")]
    Dismiss,
    Resize,
    Status,
}

/// One line of the control protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Event(CarouselEvent),
    Resize(f64),
    Status,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    UnknownVerb(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(Verb),
    #[error("'{verb}' got an invalid argument '{value}'")]
    InvalidArgument { verb: Verb, value: String },
    #[error("'{0}' takes no more arguments")]
    UnexpectedArgument(Verb),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(CommandError::Empty)?;
        let verb =
            Verb::from_str(word).map_err(|_| CommandError::UnknownVerb(word.to_string()))?;

        let arg = words.next();
        if words.next().is_some() {
            return Err(CommandError::UnexpectedArgument(verb));
        }

        let command = match verb {
            Verb::Start => no_arg(verb, arg, Command::Event(CarouselEvent::DragStart))?,
            Verb::Dismiss => no_arg(verb, arg, Command::Event(CarouselEvent::Dismiss))?,
            Verb::Status => no_arg(verb, arg, Command::Status)?,
            Verb::Drag => Command::Event(CarouselEvent::DragMove {
                delta_x: number(verb, arg)?,
            }),
            Verb::Release => Command::Event(CarouselEvent::DragEnd {
                velocity_x: number(verb, arg)?,
            }),
            Verb::Select => Command::Event(CarouselEvent::Select {
                index: number::<usize>(verb, arg)?.into(),
            }),
            Verb::Resize => {
                let width: f64 = number(verb, arg)?;
                if !width.is_finite() || width < 0.0 {
                    return Err(CommandError::InvalidArgument {
                        verb,
                        value: width.to_string(),
                    });
                }
                Command::Resize(width)
            }
        };
        Ok(command)
    }
}

fn no_arg(verb: Verb, arg: Option<&str>, command: Command) -> Result<Command, CommandError> {
    match arg {
        Some(_) => Err(CommandError::UnexpectedArgument(verb)),
        None => Ok(command),
    }
}

fn number<T: FromStr>(verb: Verb, arg: Option<&str>) -> Result<T, CommandError> {
    let value = arg.ok_or(CommandError::MissingArgument(verb))?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        verb,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let cases = vec![
            ("start", Command::Event(CarouselEvent::DragStart)),
            ("drag 100", Command::Event(CarouselEvent::DragMove { delta_x: 100.0 })),
            ("MOVE -2.5", Command::Event(CarouselEvent::DragMove { delta_x: -2.5 })),
            ("release 40", Command::Event(CarouselEvent::DragEnd { velocity_x: 40.0 })),
            (
                "  select   3 ",
                Command::Event(CarouselEvent::Select {
                    index: ItemIndex::from(3),
                }),
            ),
            ("Dismiss", Command::Event(CarouselEvent::Dismiss)),
            ("resize 600", Command::Resize(600.0)),
            ("status", Command::Status),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>().unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn test_command_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "spin 3".parse::<Command>(),
            Err(CommandError::UnknownVerb("spin".to_string()))
        );
        assert_eq!(
            "drag".parse::<Command>(),
            Err(CommandError::MissingArgument(Verb::Drag))
        );
        assert_eq!(
            "select -1".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                verb: Verb::Select,
                value: "-1".to_string()
            })
        );
        assert_eq!(
            "dismiss now".parse::<Command>(),
            Err(CommandError::UnexpectedArgument(Verb::Dismiss))
        );
        assert_eq!(
            "drag 1 2".parse::<Command>(),
            Err(CommandError::UnexpectedArgument(Verb::Drag))
        );
        assert!(matches!(
            "resize -5".parse::<Command>(),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::Release.to_string(), "release");
        assert_eq!(Verb::Drag.to_string(), "drag");
    }
}
