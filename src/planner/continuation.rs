//! Repeat-until-declined loop control
//!
//! Volumes, interfaces, evars and metadata all grow by asking "add another?".
//! The decision itself is a pure function so it can be tested without I/O;
//! [`next`] only asks the operator when the answer is not already implied.

use crate::error::Result;
use crate::resolver::OptionResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop,
}

impl Continuation {
    pub fn should_continue(self) -> bool {
        self == Self::Continue
    }
}

/// Decide whether to add another entry
///
/// A reached limit always stops, even over a preset. A preset for the next
/// index implies continuation. Otherwise the operator's answer decides, and
/// no answer means stop.
pub fn decide(preset: bool, confirmed: Option<bool>, limit_reached: bool) -> Continuation {
    if limit_reached {
        return Continuation::Stop;
    }
    if preset || confirmed == Some(true) {
        Continuation::Continue
    } else {
        Continuation::Stop
    }
}

/// Ask only when neither the limit nor a preset settles it
pub fn next(
    resolver: &mut OptionResolver<'_>,
    preset: bool,
    limit_reached: bool,
    message: &str,
) -> Result<bool> {
    let confirmed = if limit_reached || preset {
        None
    } else {
        Some(resolver.confirm(message, false)?)
    };
    Ok(decide(preset, confirmed, limit_reached).should_continue())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPrompter;

    #[test]
    fn test_limit_beats_everything() {
        assert_eq!(decide(true, Some(true), true), Continuation::Stop);
        assert_eq!(decide(false, Some(true), true), Continuation::Stop);
    }

    #[test]
    fn test_preset_implies_continue() {
        assert_eq!(decide(true, None, false), Continuation::Continue);
        assert_eq!(decide(true, Some(false), false), Continuation::Continue);
    }

    #[test]
    fn test_answer_decides_otherwise() {
        assert_eq!(decide(false, Some(true), false), Continuation::Continue);
        assert_eq!(decide(false, Some(false), false), Continuation::Stop);
        assert_eq!(decide(false, None, false), Continuation::Stop);
    }

    #[test]
    fn test_next_only_asks_when_undecided() {
        let mut prompter = ScriptedPrompter::new().confirming(true);
        let mut resolver = OptionResolver::new(&mut prompter, false);
        assert!(next(&mut resolver, true, false, "Add another?").unwrap());
        assert!(!next(&mut resolver, false, true, "Add another?").unwrap());
        assert!(next(&mut resolver, false, false, "Add another?").unwrap());
        drop(resolver);
        assert_eq!(prompter.confirmations(), 1);
    }

    #[test]
    fn test_next_without_prompting_stops() {
        let mut prompter = ScriptedPrompter::new().confirming(true);
        let mut resolver = OptionResolver::new(&mut prompter, true);
        assert!(!next(&mut resolver, false, false, "Add another?").unwrap());
        drop(resolver);
        assert_eq!(prompter.confirmations(), 0);
    }
}
