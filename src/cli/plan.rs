//! Plan commands
//!
//! Implements `tonight plan show`, `tonight plan start`, and
//! `tonight plan dismiss`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::events::Action;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::planning::Planning;
use crate::store::Store;

/// Output for plan commands
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub plan: Option<Planning>,
}

fn describe(plan: &Planning) -> HumanOutput {
    let mut human = HumanOutput::new(if plan.done() {
        format!("Plan #{} (done)", plan.id)
    } else {
        format!("Plan #{}", plan.id)
    });
    human.push_summary("budget", plan.duration.clone());
    let total = plan.total_duration();
    human.push_summary(
        "planned",
        format!("{}h{:02}m", total.as_secs() / 3600, total.as_secs() % 3600 / 60),
    );
    for task in &plan.tasks {
        let marker = if task.is_done() { 'x' } else { ' ' };
        human.push_detail(format!("#{} [{marker}] {}", task.id, task.title));
    }
    human
}

/// Run `tonight plan show`
pub async fn run_show(store: &Store, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::FetchPlan).await?;

    let plan = store.planning();
    let human = match &plan {
        Some(plan) => describe(plan),
        None => HumanOutput::new("No active plan"),
    };
    emit_success(options, "plan show", &PlanOutput { plan }, Some(&human))
}

/// Run `tonight plan start`
pub async fn run_start(store: &Store, input: String, options: OutputOptions) -> Result<()> {
    let input = input.trim().to_string();
    if input.is_empty() {
        return Err(Error::InvalidArgument(
            "plan input cannot be empty".to_string(),
        ));
    }

    store.dispatch(Action::StartPlan(input)).await?;

    let plan = store.planning();
    let human = match &plan {
        Some(plan) => describe(plan),
        None => HumanOutput::new("No plan started"),
    };
    emit_success(options, "plan start", &PlanOutput { plan }, Some(&human))
}

/// Run `tonight plan dismiss`
pub async fn run_dismiss(store: &Store, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::DismissPlan).await?;

    let human = HumanOutput::new("Plan dismissed");
    emit_success(options, "plan dismiss", &PlanOutput { plan: None }, Some(&human))
}
