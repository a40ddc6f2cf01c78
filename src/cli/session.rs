//! Session commands
//!
//! Implements `tonight login`, `tonight logout`, `tonight whoami`, and
//! `tonight tag`.

use serde::Serialize;

use crate::error::Result;
use crate::events::{Action, Credentials};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::Session;
use crate::store::Store;

/// Output for session commands
#[derive(Debug, Serialize)]
pub struct SessionOutput {
    pub authenticated: bool,
    pub session: Session,
}

fn session_output(session: Session) -> SessionOutput {
    SessionOutput {
        authenticated: session.is_authenticated(),
        session,
    }
}

fn describe(session: &Session) -> String {
    if session.is_authenticated() {
        format!("Signed in as {}", session.name)
    } else {
        "Not signed in".to_string()
    }
}

/// Run `tonight login`
pub async fn run_login(
    store: &Store,
    username: String,
    password: String,
    options: OutputOptions,
) -> Result<()> {
    store
        .dispatch(Action::Login(Credentials { username, password }))
        .await?;

    let session = store.session();
    let human = HumanOutput::new(describe(&session));
    emit_success(options, "login", &session_output(session), Some(&human))
}

/// Run `tonight logout`
pub async fn run_logout(store: &Store, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::Logout).await?;

    let session = store.session();
    let human = HumanOutput::new("Signed out");
    emit_success(options, "logout", &session_output(session), Some(&human))
}

/// Run `tonight whoami`
pub async fn run_whoami(store: &Store, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::LoadSession).await?;

    let session = store.session();
    let mut human = HumanOutput::new(describe(&session));
    if session.is_authenticated() {
        human.push_summary("id", session.id.to_string());
        for (tag, colour) in &session.tag_colours {
            human.push_detail(format!("{tag}: {colour}"));
        }
    }
    emit_success(options, "whoami", &session_output(session), Some(&human))
}

/// Run `tonight tag`
pub async fn run_tag(
    store: &Store,
    tag: String,
    colour: String,
    options: OutputOptions,
) -> Result<()> {
    store
        .dispatch(Action::CustomizeTagColour {
            tag: tag.clone(),
            colour: colour.clone(),
        })
        .await?;

    let session = store.session();
    let mut human = HumanOutput::new(format!("Tag '{tag}' set to {colour}"));
    for (tag, colour) in &session.tag_colours {
        human.push_detail(format!("{tag}: {colour}"));
    }
    emit_success(options, "tag", &session_output(session), Some(&human))
}
