use std::str::FromStr;

use stacker_engine::InputCommand;

/// One step of an input script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Input(InputCommand),
    /// Let one fall interval pass.
    Wait,
}

impl ScriptStep {
    fn from_char(c: char) -> Option<Self> {
        let step = match c.to_ascii_uppercase() {
            'L' => Self::Input(InputCommand::ShiftLeft),
            'R' => Self::Input(InputCommand::ShiftRight),
            'C' => Self::Input(InputCommand::RotateCw),
            'A' => Self::Input(InputCommand::RotateCcw),
            'D' => Self::Input(InputCommand::Drop),
            'H' => Self::Input(InputCommand::HardDrop),
            '.' => Self::Wait,
            _ => return None,
        };
        Some(step)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown script command {found:?} at position {position} (expected one of L R C A D H .)")]
pub struct ParseScriptError {
    #[error(not(source))]
    found: char,
    position: usize,
}

/// Sequence of steps parsed from text such as `"LLCH.."`.
///
/// Whitespace is ignored so long scripts can be grouped per piece.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    /// Hard-drops `pieces` pieces without moving them.
    pub fn hard_drops(pieces: usize) -> Self {
        Self {
            steps: vec![ScriptStep::Input(InputCommand::HardDrop); pieces],
        }
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

impl FromStr for Script {
    type Err = ParseScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(position, found)| {
                ScriptStep::from_char(found).ok_or(ParseScriptError { found, position })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { steps })
    }
}
