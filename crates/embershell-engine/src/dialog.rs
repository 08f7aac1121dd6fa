//! Dialog trees: staged conversations with answer-driven transitions.

use crate::data::{DialogAnswerData, DialogData, ObjectRef};

/// One stage of a running dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogStage {
    id: String,
    text: String,
    start: bool,
    answers: Vec<DialogAnswerData>,
}

impl DialogStage {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[DialogAnswerData] {
        &self.answers
    }
}

/// A dialog state machine owned by a character.
///
/// The owner is the character carrying the dialog; the target is whoever
/// is currently talking to them. Advancing past a stage with no `to`
/// transition finishes the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    data: DialogData,
    owner: Option<ObjectRef>,
    target: Option<ObjectRef>,
    stages: Vec<DialogStage>,
    active: Option<usize>,
    finished: bool,
}

impl Dialog {
    pub fn new(data: DialogData, owner: Option<ObjectRef>) -> Self {
        let stages = data
            .stages
            .iter()
            .map(|s| DialogStage {
                id: s.id.clone(),
                text: s.text.clone(),
                start: s.start,
                answers: s.answers.clone(),
            })
            .collect();
        Self {
            data,
            owner,
            target: None,
            stages,
            active: None,
            finished: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn data(&self) -> &DialogData {
        &self.data
    }

    pub fn owner(&self) -> Option<&ObjectRef> {
        self.owner.as_ref()
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: Option<ObjectRef>) {
        self.target = target;
    }

    /// The stage the dialog currently sits at, if it is running.
    pub fn active_stage(&self) -> Option<&DialogStage> {
        self.active.and_then(|i| self.stages.get(i))
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Resets the dialog to its start stage (the first stage flagged
    /// `start`, or the first stage at all).
    pub fn restart(&mut self) {
        self.finished = false;
        self.active = self
            .stages
            .iter()
            .position(|s| s.start)
            .or(if self.stages.is_empty() { None } else { Some(0) });
    }

    /// Advances the dialog with the answer picked at the active stage.
    ///
    /// Unknown answer IDs are ignored (the dialog stays where it is);
    /// an answer with no `to` transition finishes the dialog.
    pub fn answer(&mut self, answer_id: &str) {
        let Some(stage) = self.active_stage() else {
            return;
        };
        let Some(answer) = stage.answers.iter().find(|a| a.id == answer_id)
        else {
            tracing::debug!(
                dialog = self.data.id,
                answer = answer_id,
                "unknown dialog answer — ignoring"
            );
            return;
        };
        match answer.to.clone() {
            Some(to) => {
                self.active = self.stages.iter().position(|s| s.id == to);
                if self.active.is_none() {
                    // Broken transition: treat like an ending.
                    tracing::debug!(
                        dialog = self.data.id,
                        to,
                        "dialog transition to unknown stage — finishing"
                    );
                    self.finished = true;
                }
            }
            None => {
                self.active = None;
                self.finished = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DialogStageData;

    fn two_stage_dialog() -> Dialog {
        Dialog::new(
            DialogData {
                id: "greeting".into(),
                stages: vec![
                    DialogStageData {
                        id: "hello".into(),
                        text: "Well met.".into(),
                        start: true,
                        answers: vec![
                            DialogAnswerData {
                                id: "ask".into(),
                                text: "Any work?".into(),
                                to: Some("work".into()),
                            },
                            DialogAnswerData {
                                id: "bye".into(),
                                text: "Farewell.".into(),
                                to: None,
                            },
                        ],
                    },
                    DialogStageData {
                        id: "work".into(),
                        text: "Rats in the cellar.".into(),
                        start: false,
                        answers: vec![DialogAnswerData {
                            id: "done".into(),
                            text: "On it.".into(),
                            to: None,
                        }],
                    },
                ],
            },
            Some(ObjectRef::new("innkeep", "0")),
        )
    }

    #[test]
    fn test_restart_activates_start_stage() {
        let mut d = two_stage_dialog();
        assert!(d.active_stage().is_none());

        d.restart();

        assert_eq!(d.active_stage().map(DialogStage::id), Some("hello"));
    }

    #[test]
    fn test_answer_follows_transition() {
        let mut d = two_stage_dialog();
        d.restart();

        d.answer("ask");

        assert_eq!(d.active_stage().map(DialogStage::id), Some("work"));
        assert!(!d.finished());
    }

    #[test]
    fn test_answer_without_transition_finishes_dialog() {
        let mut d = two_stage_dialog();
        d.restart();

        d.answer("bye");

        assert!(d.finished());
        assert!(d.active_stage().is_none());
    }

    #[test]
    fn test_unknown_answer_keeps_stage() {
        let mut d = two_stage_dialog();
        d.restart();

        d.answer("nonsense");

        assert_eq!(d.active_stage().map(DialogStage::id), Some("hello"));
    }

    #[test]
    fn test_restart_after_finish_reenters_start_stage() {
        let mut d = two_stage_dialog();
        d.restart();
        d.answer("bye");
        assert!(d.finished());

        d.restart();

        assert!(!d.finished());
        assert_eq!(d.active_stage().map(DialogStage::id), Some("hello"));
    }
}
