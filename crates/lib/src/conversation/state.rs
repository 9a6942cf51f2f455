//! The questionnaire's states and its transition table.
//!
//! `transition` is a pure function of `(state, event, upload_branch)`. It decides the
//! next state and names the side effect the controller has to carry out; it never
//! touches sessions or collaborators itself.

use crate::{
    constants::{
        CANCELLED_MESSAGE, CLOSING_MESSAGE, INVALID_DOCUMENT, UPLOAD_QUESTION, UPLOAD_REQUEST,
        YES_NO_REPROMPT,
    },
    session::Field,
    types::DocumentRef,
};
use serde::{Deserialize, Serialize};

/// A point in the fixed question sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Industry,
    Objective,
    Website,
    SocialMedia,
    Ppc,
    Audience,
    Location,
    UploadDecision,
    AwaitDocument,
    End,
}

impl State {
    /// The state a new session starts in.
    pub const FIRST: State = State::Industry;

    /// The free-text states in question order.
    pub const QUESTIONS: [State; 7] = [
        State::Industry,
        State::Objective,
        State::Website,
        State::SocialMedia,
        State::Ppc,
        State::Audience,
        State::Location,
    ];

    /// The field answered while in this state.
    pub fn field(self) -> Option<Field> {
        match self {
            State::Industry => Some(Field::Industry),
            State::Objective => Some(Field::Objective),
            State::Website => Some(Field::Website),
            State::SocialMedia => Some(Field::SocialMedia),
            State::Ppc => Some(Field::Ppc),
            State::Audience => Some(Field::Audience),
            State::Location => Some(Field::Location),
            State::UploadDecision | State::AwaitDocument | State::End => None,
        }
    }

    /// The message shown when entering this state.
    pub fn prompt(self) -> Option<&'static str> {
        match self {
            State::Industry => Some("What industry is your business in?"),
            State::Objective => {
                Some("What is your business objective (e.g., lead generation, sales)?")
            }
            State::Website => Some("Do you have a website? If yes, please share the URL."),
            State::SocialMedia => {
                Some("Do you have any social media platforms? If yes, please share the URL(s).")
            }
            State::Ppc => Some("Do you use PPC campaigns? (yes/no)"),
            State::Audience => {
                Some("Who are you trying to reach? (e.g., young adults, professionals, etc.)")
            }
            State::Location => Some("What location(s) would you like to target?"),
            State::UploadDecision => Some(UPLOAD_QUESTION),
            State::AwaitDocument => Some(UPLOAD_REQUEST),
            State::End => None,
        }
    }

    /// The next question after a plain free-text answer.
    fn next_question(self) -> Option<State> {
        match self {
            State::Industry => Some(State::Objective),
            State::Objective => Some(State::Website),
            State::Website => Some(State::SocialMedia),
            State::SocialMedia => Some(State::Ppc),
            State::Ppc => Some(State::Audience),
            State::Audience => Some(State::Location),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == State::End
    }
}

/// Something the user did inside a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Text(String),
    Document(DocumentRef),
    Cancel,
}

/// The side effect attached to a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Store the answer and ask the next state's question.
    Record { field: Field, value: String },
    /// Store the location, then generate keywords from every field.
    /// `follow_up` asks about the upload branch afterwards; without it the
    /// keywords are trimmed to a short sample.
    GenerateKeywords { location: String, follow_up: bool },
    /// Download and extract the document, then generate keywords from its text.
    RefineFromDocument(DocumentRef),
    /// Send a fixed message.
    Say(&'static str),
    /// The event has no meaning in this state.
    Ignore,
}

/// The outcome of looking up `(state, event)` in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: State,
    pub action: Action,
}

impl Transition {
    fn to(next: State, action: Action) -> Self {
        Self { next, action }
    }

    fn stay(state: State, action: Action) -> Self {
        Self::to(state, action)
    }
}

/// Parses a yes/no answer, ignoring case and surrounding whitespace.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    let answer = input.trim();
    if answer.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if answer.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// The transition table.
pub fn transition(state: State, event: Event, upload_branch: bool) -> Transition {
    match (state, event) {
        (State::End, _) => Transition::stay(State::End, Action::Ignore),
        (_, Event::Cancel) => Transition::to(State::End, Action::Say(CANCELLED_MESSAGE)),

        (State::Location, Event::Text(location)) => {
            let next = if upload_branch {
                State::UploadDecision
            } else {
                State::End
            };
            Transition::to(
                next,
                Action::GenerateKeywords {
                    location,
                    follow_up: upload_branch,
                },
            )
        }

        (State::UploadDecision, Event::Text(answer)) => match parse_yes_no(&answer) {
            Some(true) => Transition::to(State::AwaitDocument, Action::Say(UPLOAD_REQUEST)),
            Some(false) => Transition::to(State::End, Action::Say(CLOSING_MESSAGE)),
            None => Transition::stay(State::UploadDecision, Action::Say(YES_NO_REPROMPT)),
        },

        (State::AwaitDocument, Event::Document(document)) => {
            if document.is_pdf() {
                Transition::to(State::End, Action::RefineFromDocument(document))
            } else {
                Transition::stay(State::AwaitDocument, Action::Say(INVALID_DOCUMENT))
            }
        }
        (State::AwaitDocument, Event::Text(_)) => {
            Transition::stay(State::AwaitDocument, Action::Say(UPLOAD_REQUEST))
        }

        (state, Event::Text(value)) => match (state.field(), state.next_question()) {
            (Some(field), Some(next)) => Transition::to(next, Action::Record { field, value }),
            _ => Transition::stay(state, Action::Ignore),
        },

        (state, Event::Document(_)) => Transition::stay(state, Action::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    #[test]
    fn test_free_text_states_advance_one_step() {
        let expected = [
            (State::Industry, State::Objective, Field::Industry),
            (State::Objective, State::Website, Field::Objective),
            (State::Website, State::SocialMedia, Field::Website),
            (State::SocialMedia, State::Ppc, Field::SocialMedia),
            (State::Ppc, State::Audience, Field::Ppc),
            (State::Audience, State::Location, Field::Audience),
        ];
        for (from, to, field) in expected {
            for branch in [false, true] {
                let t = transition(from, text(""), branch);
                assert_eq!(t.next, to);
                assert_eq!(
                    t.action,
                    Action::Record {
                        field,
                        value: String::new()
                    }
                );
            }
        }
    }

    #[test]
    fn test_location_depends_on_variant() {
        let a = transition(State::Location, text("Berlin"), false);
        assert_eq!(a.next, State::End);
        assert_eq!(
            a.action,
            Action::GenerateKeywords {
                location: "Berlin".into(),
                follow_up: false
            }
        );

        let b = transition(State::Location, text("Berlin"), true);
        assert_eq!(b.next, State::UploadDecision);
        assert_eq!(
            b.action,
            Action::GenerateKeywords {
                location: "Berlin".into(),
                follow_up: true
            }
        );
    }

    #[test]
    fn test_upload_decision() {
        for yes in ["yes", "Yes", "YES", "  yes "] {
            let t = transition(State::UploadDecision, text(yes), true);
            assert_eq!(t.next, State::AwaitDocument, "input {yes:?}");
            assert_eq!(t.action, Action::Say(UPLOAD_REQUEST));
        }
        for no in ["no", "NO", "No"] {
            let t = transition(State::UploadDecision, text(no), true);
            assert_eq!(t.next, State::End, "input {no:?}");
            assert_eq!(t.action, Action::Say(CLOSING_MESSAGE));
        }
        for other in ["maybe", "", "yes please", "y"] {
            let t = transition(State::UploadDecision, text(other), true);
            assert_eq!(t.next, State::UploadDecision, "input {other:?}");
            assert_eq!(t.action, Action::Say(YES_NO_REPROMPT));
        }
    }

    #[test]
    fn test_await_document() {
        let pdf = DocumentRef::new("f1").with_mime_type("application/pdf");
        let t = transition(State::AwaitDocument, Event::Document(pdf.clone()), true);
        assert_eq!(t.next, State::End);
        assert_eq!(t.action, Action::RefineFromDocument(pdf));

        let png = DocumentRef::new("f2").with_mime_type("image/png");
        let t = transition(State::AwaitDocument, Event::Document(png), true);
        assert_eq!(t.next, State::AwaitDocument);
        assert_eq!(t.action, Action::Say(INVALID_DOCUMENT));

        let t = transition(State::AwaitDocument, text("here it is"), true);
        assert_eq!(t.next, State::AwaitDocument);
        assert_eq!(t.action, Action::Say(UPLOAD_REQUEST));
    }

    #[test]
    fn test_cancel_from_every_live_state() {
        for state in State::QUESTIONS
            .into_iter()
            .chain([State::UploadDecision, State::AwaitDocument])
        {
            let t = transition(state, Event::Cancel, true);
            assert_eq!(t.next, State::End);
            assert_eq!(t.action, Action::Say(CANCELLED_MESSAGE));
        }
    }

    #[test]
    fn test_documents_outside_upload_are_ignored() {
        let pdf = DocumentRef::new("f1").with_mime_type("application/pdf");
        let t = transition(State::Website, Event::Document(pdf), true);
        assert_eq!(t.next, State::Website);
        assert_eq!(t.action, Action::Ignore);
    }

    #[test]
    fn test_every_live_state_has_a_prompt() {
        for state in State::QUESTIONS
            .into_iter()
            .chain([State::UploadDecision, State::AwaitDocument])
        {
            assert!(state.prompt().is_some(), "{state:?} has no prompt");
        }
        assert!(State::End.prompt().is_none());
    }

    proptest::proptest! {
        #[test]
        fn test_any_six_answers_reach_location(
            answers in proptest::collection::vec(".{0,40}", 6),
            upload_branch: bool,
        ) {
            let mut state = State::FIRST;
            for (answer, field) in answers.iter().zip(Field::ALL) {
                let t = transition(state, text(answer), upload_branch);
                proptest::prop_assert_eq!(
                    t.action,
                    Action::Record { field, value: answer.clone() }
                );
                state = t.next;
            }
            proptest::prop_assert_eq!(state, State::Location);
        }
    }
}
