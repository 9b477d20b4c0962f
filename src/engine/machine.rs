// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The staged transition protocol as a pure state machine.
//!
//! ```text
//! Idle --Start--> Optimistic
//! Optimistic --Assessed(None)--> Confirmed
//! Optimistic --Assessed(Some(i))--> Troubleshooting { goal: i, attempt: 1 }
//! Diagnosing { goal } --Checked(met)--> next goal / Confirmed
//! Diagnosing { goal } --Checked(unmet)--> Troubleshooting { goal, attempt: 1 }
//! Troubleshooting { goal, attempt } --Checked(met)--> next goal / Confirmed
//! Troubleshooting { goal, attempt } --Checked(unmet)--> attempt + 1, or Failed { goal }
//! ```
//!
//! The machine only decides; the engine performs the I/O each stage calls
//! for and feeds the result back as an [`Event`].

use std::fmt;

use crate::engine::TransitionRequest;
use crate::types::{InputPort, PowerState};

/// Power state a transition drives towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerTarget {
    /// Fully on.
    On,
    /// In standby.
    Standby,
}

impl PowerTarget {
    /// Returns true if `state` satisfies this target.
    #[must_use]
    pub const fn is_reached_by(self, state: PowerState) -> bool {
        matches!(
            (self, state),
            (Self::On, PowerState::On) | (Self::Standby, PowerState::Standby)
        )
    }
}

/// One independently verifiable piece of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubGoal {
    /// The device reports the target power state.
    Power(PowerTarget),
    /// The source on this input is the announced active source.
    ActiveSource(InputPort),
}

impl SubGoal {
    /// Message used when the retry budget for this sub-goal runs out.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Power(PowerTarget::On) => "TV did not turn on after retries",
            Self::Power(PowerTarget::Standby) => "TV did not turn off after retries",
            Self::ActiveSource(_) => "input switch failed after retries",
        }
    }
}

impl fmt::Display for SubGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(PowerTarget::On) => f.write_str("power on"),
            Self::Power(PowerTarget::Standby) => f.write_str("standby"),
            Self::ActiveSource(port) => write!(f, "active source {port}"),
        }
    }
}

/// Where a transition currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Not started.
    Idle,
    /// Fire every primary command, settle, then assess all sub-goals.
    Optimistic,
    /// Check one sub-goal once, without retrying it yet.
    Diagnosing {
        /// Index into the plan's sub-goals.
        goal: usize,
    },
    /// Re-issue one sub-goal's command and verify it.
    Troubleshooting {
        /// Index into the plan's sub-goals.
        goal: usize,
        /// 1-based attempt number within the retry budget.
        attempt: u32,
    },
    /// Every sub-goal observed. Terminal.
    Confirmed,
    /// A sub-goal exhausted its budget. Terminal.
    Failed {
        /// Index of the unmet sub-goal.
        goal: usize,
    },
}

impl Stage {
    /// Returns true for `Confirmed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed { .. })
    }
}

/// Result of the I/O performed for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Begin the transition.
    Start,
    /// Optimistic assessment finished; carries the first unmet sub-goal.
    Assessed {
        /// Index of the first unmet sub-goal, if any.
        first_unmet: Option<usize>,
    },
    /// One sub-goal was checked.
    Checked {
        /// Whether it was observed.
        met: bool,
    },
}

/// Ordered sub-goals of one transition plus its retry budget.
///
/// # Examples
///
/// ```
/// use cec_hub::engine::{Event, Stage, TransitionPlan, TransitionRequest};
///
/// let plan = TransitionPlan::new(&TransitionRequest::PowerOff, 2);
/// let stage = plan.advance(Stage::Idle, Event::Start);
/// assert_eq!(stage, Stage::Optimistic);
///
/// let stage = plan.advance(stage, Event::Assessed { first_unmet: None });
/// assert_eq!(stage, Stage::Confirmed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    goals: Vec<SubGoal>,
    retry_budget: u32,
}

impl TransitionPlan {
    /// Plans `request`, allowing `retry_budget` retries per sub-goal.
    ///
    /// Power always comes before input selection.
    #[must_use]
    pub fn new(request: &TransitionRequest, retry_budget: u32) -> Self {
        let goals = match *request {
            TransitionRequest::PowerOn { input } => {
                let mut goals = vec![SubGoal::Power(PowerTarget::On)];
                goals.extend(input.map(SubGoal::ActiveSource));
                goals
            }
            TransitionRequest::PowerOff => vec![SubGoal::Power(PowerTarget::Standby)],
            TransitionRequest::SwitchInput { input } => vec![
                SubGoal::Power(PowerTarget::On),
                SubGoal::ActiveSource(input),
            ],
        };
        Self {
            goals,
            retry_budget,
        }
    }

    /// Returns the sub-goals in the order they are verified.
    #[must_use]
    pub fn goals(&self) -> &[SubGoal] {
        &self.goals
    }

    /// Returns the sub-goal at `index`.
    #[must_use]
    pub fn goal(&self, index: usize) -> Option<SubGoal> {
        self.goals.get(index).copied()
    }

    /// Returns the retry budget per sub-goal.
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Computes the next stage.
    ///
    /// Events that make no sense in `stage` leave it unchanged; terminal
    /// stages absorb every event.
    #[must_use]
    pub fn advance(&self, stage: Stage, event: Event) -> Stage {
        match (stage, event) {
            (Stage::Idle, Event::Start) => Stage::Optimistic,
            (Stage::Optimistic, Event::Assessed { first_unmet }) => match first_unmet {
                None => Stage::Confirmed,
                Some(goal) => self.begin_retries(goal),
            },
            (Stage::Diagnosing { goal }, Event::Checked { met }) => {
                if met {
                    self.after(goal)
                } else {
                    self.begin_retries(goal)
                }
            }
            (Stage::Troubleshooting { goal, attempt }, Event::Checked { met }) => {
                if met {
                    self.after(goal)
                } else if attempt < self.retry_budget {
                    Stage::Troubleshooting {
                        goal,
                        attempt: attempt + 1,
                    }
                } else {
                    Stage::Failed { goal }
                }
            }
            (stage, _) => stage,
        }
    }

    fn begin_retries(&self, goal: usize) -> Stage {
        if self.retry_budget == 0 {
            Stage::Failed { goal }
        } else {
            Stage::Troubleshooting { goal, attempt: 1 }
        }
    }

    fn after(&self, goal: usize) -> Stage {
        if goal + 1 < self.goals.len() {
            Stage::Diagnosing { goal: goal + 1 }
        } else {
            Stage::Confirmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u8) -> InputPort {
        InputPort::new(n).unwrap()
    }

    fn switch_plan(budget: u32) -> TransitionPlan {
        TransitionPlan::new(&TransitionRequest::SwitchInput { input: port(2) }, budget)
    }

    #[test]
    fn plans_put_power_first() {
        let plan = switch_plan(3);
        assert_eq!(
            plan.goals(),
            &[
                SubGoal::Power(PowerTarget::On),
                SubGoal::ActiveSource(port(2))
            ]
        );

        let plan = TransitionPlan::new(&TransitionRequest::PowerOn { input: None }, 3);
        assert_eq!(plan.goals(), &[SubGoal::Power(PowerTarget::On)]);

        let plan = TransitionPlan::new(&TransitionRequest::PowerOff, 3);
        assert_eq!(plan.goals(), &[SubGoal::Power(PowerTarget::Standby)]);
    }

    #[test]
    fn optimistic_success_confirms() {
        let plan = switch_plan(3);
        let stage = plan.advance(Stage::Idle, Event::Start);
        assert_eq!(
            plan.advance(stage, Event::Assessed { first_unmet: None }),
            Stage::Confirmed
        );
    }

    #[test]
    fn unmet_power_goes_to_troubleshooting_then_diagnoses_input() {
        let plan = switch_plan(3);
        let stage = plan.advance(Stage::Optimistic, Event::Assessed {
            first_unmet: Some(0),
        });
        assert_eq!(stage, Stage::Troubleshooting { goal: 0, attempt: 1 });

        let stage = plan.advance(stage, Event::Checked { met: true });
        assert_eq!(stage, Stage::Diagnosing { goal: 1 });

        let stage = plan.advance(stage, Event::Checked { met: true });
        assert_eq!(stage, Stage::Confirmed);
    }

    #[test]
    fn unmet_input_is_retried_on_its_own() {
        let plan = switch_plan(3);
        let stage = plan.advance(Stage::Optimistic, Event::Assessed {
            first_unmet: Some(1),
        });
        assert_eq!(stage, Stage::Troubleshooting { goal: 1, attempt: 1 });
    }

    #[test]
    fn budget_is_exact() {
        let plan = switch_plan(3);
        let mut stage = Stage::Troubleshooting { goal: 0, attempt: 1 };
        let mut attempts = 1;
        loop {
            stage = plan.advance(stage, Event::Checked { met: false });
            if stage.is_terminal() {
                break;
            }
            attempts += 1;
        }
        assert_eq!(attempts, 3);
        assert_eq!(stage, Stage::Failed { goal: 0 });
    }

    #[test]
    fn zero_budget_fails_immediately() {
        let plan = switch_plan(0);
        assert_eq!(
            plan.advance(Stage::Optimistic, Event::Assessed {
                first_unmet: Some(0)
            }),
            Stage::Failed { goal: 0 }
        );
        assert_eq!(
            plan.advance(Stage::Diagnosing { goal: 1 }, Event::Checked { met: false }),
            Stage::Failed { goal: 1 }
        );
    }

    #[test]
    fn terminal_stages_absorb_events() {
        let plan = switch_plan(3);
        assert_eq!(plan.advance(Stage::Confirmed, Event::Start), Stage::Confirmed);
        assert_eq!(
            plan.advance(Stage::Failed { goal: 1 }, Event::Checked { met: true }),
            Stage::Failed { goal: 1 }
        );
    }

    #[test]
    fn mismatched_event_is_ignored() {
        let plan = switch_plan(3);
        assert_eq!(
            plan.advance(Stage::Idle, Event::Checked { met: true }),
            Stage::Idle
        );
    }

    #[test]
    fn power_target_matching() {
        assert!(PowerTarget::On.is_reached_by(PowerState::On));
        assert!(!PowerTarget::On.is_reached_by(PowerState::TransitioningToOn));
        assert!(PowerTarget::Standby.is_reached_by(PowerState::Standby));
        assert!(!PowerTarget::Standby.is_reached_by(PowerState::Unknown));
    }

    #[test]
    fn failure_messages_name_the_subgoal() {
        assert_eq!(
            SubGoal::Power(PowerTarget::Standby).failure_message(),
            "TV did not turn off after retries"
        );
        assert_eq!(
            SubGoal::ActiveSource(port(1)).failure_message(),
            "input switch failed after retries"
        );
    }
}
