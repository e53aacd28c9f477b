//! Run a recorded scan trace through the keyboard core.

use std::fmt;

use anyhow::{Context, Result};
use satan_core::{
    HostSink, Keyboard, KeyboardConfig, Keycode, Keymap, MatrixSnapshot, Mode, Mods, PinDriver,
    ReportBuilder, RowBits,
};

use crate::trace::TraceStep;

/// Pin driver that plays back one trace snapshot per scan pass.
#[derive(Default)]
pub struct TracePins {
    closed: MatrixSnapshot,
    selected: Option<usize>,
    duty: u8,
}

impl TracePins {
    pub fn load(&mut self, closed: MatrixSnapshot) {
        self.closed = closed;
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }
}

impl PinDriver for TracePins {
    fn assert_row(&mut self, row: usize) {
        self.selected = Some(row);
    }

    fn release_row(&mut self, _row: usize) {
        self.selected = None;
    }

    fn settle(&mut self) {}

    fn sample_columns(&mut self) -> RowBits {
        // Pulled-up inputs: closed switches on the selected row read low
        match self.selected {
            Some(row) => !self.closed[row],
            None => RowBits::MAX,
        }
    }

    fn set_output_level(&mut self, level: u8) {
        self.duty = level;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    Press {
        pass: u64,
        code: Keycode,
        oneshot: Mods,
        report: [u8; 8],
    },
    Release {
        pass: u64,
        code: Keycode,
        report: [u8; 8],
    },
    Layers {
        pass: u64,
        default: u8,
        overlays: Vec<u8>,
    },
}

impl fmt::Display for ReplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayEvent::Press {
                pass,
                code,
                oneshot,
                report,
            } => {
                write!(f, "{:>6}  press   {:?}", pass, code)?;
                if !oneshot.is_empty() {
                    write!(f, " (one-shot 0x{:02X})", oneshot.0)?;
                }
                write!(f, "  {}", hex_report(report))
            }
            ReplayEvent::Release { pass, code, report } => {
                write!(f, "{:>6}  release {:?}  {}", pass, code, hex_report(report))
            }
            ReplayEvent::Layers {
                pass,
                default,
                overlays,
            } => write!(f, "{:>6}  layers  default {} overlays {:?}", pass, default, overlays),
        }
    }
}

fn hex_report(report: &[u8; 8]) -> String {
    report
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Host sink recording every key event with the report it produced.
#[derive(Default)]
struct Recorder {
    pass: u64,
    report: ReportBuilder,
    events: Vec<ReplayEvent>,
}

impl HostSink for Recorder {
    fn press(&mut self, code: Keycode, oneshot: Mods) {
        self.report.press(code, oneshot);
        self.events.push(ReplayEvent::Press {
            pass: self.pass,
            code,
            oneshot,
            report: self.report.report().to_bytes(),
        });
    }

    fn release(&mut self, code: Keycode) {
        self.report.release(code);
        self.events.push(ReplayEvent::Release {
            pass: self.pass,
            code,
            report: self.report.report().to_bytes(),
        });
    }
}

/// Outcome of a replay.
#[derive(Debug)]
pub struct Replay {
    pub events: Vec<ReplayEvent>,
    pub passes: u64,
    pub duty: u8,
    pub level: u8,
    pub mode: Mode,
}

pub fn replay(steps: &[TraceStep], keymap: Keymap, config: &KeyboardConfig) -> Result<Replay> {
    let mut keyboard =
        Keyboard::new(TracePins::default(), keymap, config).context("setting up keyboard")?;
    let mut host = Recorder::default();
    let mut layers = keyboard.layers().clone();
    let mut duty = keyboard.pins().duty();

    for step in steps {
        tracing::trace!(line = step.line, repeat = step.repeat, "trace step");
        for _ in 0..step.repeat {
            host.pass += 1;
            keyboard.pins_mut().load(step.closed);
            keyboard.tick(&mut host);

            if *keyboard.layers() != layers {
                layers = keyboard.layers().clone();
                host.events.push(ReplayEvent::Layers {
                    pass: host.pass,
                    default: layers.default_layer(),
                    overlays: layers.overlays().to_vec(),
                });
            }

            let now = keyboard.pins().duty();
            if now != duty {
                tracing::trace!(pass = host.pass, duty = now, "backlight");
                duty = now;
            }
        }
    }

    tracing::debug!(passes = host.pass, events = host.events.len(), "replay finished");

    Ok(Replay {
        events: host.events,
        passes: host.pass,
        duty,
        level: keyboard.backlight().level(),
        mode: keyboard.backlight().mode(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::parse_trace;

    fn run(trace: &str) -> Replay {
        let steps = parse_trace(trace).unwrap();
        replay(&steps, Keymap::builtin().unwrap(), &KeyboardConfig::DEFAULT).unwrap()
    }

    #[test]
    fn test_tap_produces_press_and_release() {
        let result = run("2,3 *5\n- *5\n");
        assert_eq!(result.passes, 10);
        assert_eq!(
            result.events,
            vec![
                ReplayEvent::Press {
                    pass: 5,
                    code: Keycode::D,
                    oneshot: Mods::NONE,
                    report: [0, 0, 0x07, 0, 0, 0, 0, 0],
                },
                ReplayEvent::Release {
                    pass: 10,
                    code: Keycode::D,
                    report: [0; 8],
                },
            ]
        );
        assert_eq!(result.level, 55);
        assert_eq!(result.duty, 55);
    }

    #[test]
    fn test_function_layer_changes_are_reported() {
        let result = run("4,10 *5\n4,10 1,7 *5\n- *5\n");
        assert_eq!(
            result.events,
            vec![
                ReplayEvent::Layers {
                    pass: 5,
                    default: 0,
                    overlays: vec![5],
                },
                ReplayEvent::Press {
                    pass: 10,
                    code: Keycode::Home,
                    oneshot: Mods::NONE,
                    report: [0, 0, 0x4A, 0, 0, 0, 0, 0],
                },
                ReplayEvent::Release {
                    pass: 15,
                    code: Keycode::Home,
                    report: [0; 8],
                },
                ReplayEvent::Layers {
                    pass: 15,
                    default: 0,
                    overlays: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_chatter_is_silent() {
        let result = run("2,3\n-\n2,3\n-\n2,3\n-\n");
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_display_format() {
        let event = ReplayEvent::Press {
            pass: 42,
            code: Keycode::A,
            oneshot: Mods::LSHIFT,
            report: [0x02, 0, 0x04, 0, 0, 0, 0, 0],
        };
        assert_eq!(
            event.to_string(),
            "    42  press   A (one-shot 0x02)  02 00 04 00 00 00 00 00"
        );
    }
}
