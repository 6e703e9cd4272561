//! Terminal front end: a stdin/stdout REPL that drives the screens.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::{AgeRange, AssessmentApi, AssessmentId, HttpAssessmentApi, OccupationType};
use crate::config::ClientConfig;
use crate::error::{self, ScreenError};
use crate::identity::IdentityStore;
use crate::intake::{IntakeStage, IntakeWizard, ResponseField};
use crate::progress::{ProgressState, ProgressTracker};
use crate::recovery::{Category, RecoveryPlanManager, RecoveryState};
use crate::result::{ResultPresenter, ResultState};
use crate::workflow::{self, Navigation, Screen};

const HELP: &str = "\
Navigation:  home | menu | go <assessment|recovery|progress> | result <id> | quit
Assessment:  name <text> | age <range> | occupation <type> | set <field> <value> | submit | restart
Result:      plan
Recovery:    generate | regenerate | toggle <daily|weekly> <n>
Progress:    add | score <0-100> | note <text> | save | cancel
Anywhere:    show | reload | forget | help";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Home,
    Menu,
    Go(Screen),
    Show,
    Reload,
    Forget,
    Name(String),
    Age(AgeRange),
    Occupation(OccupationType),
    Set(ResponseField, f64),
    Submit,
    Restart,
    GeneratePlan,
    Regenerate,
    Toggle(Category, usize),
    OpenForm,
    Score(f64),
    Note(String),
    Save,
    Cancel,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let cmd = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "quit" | "exit" | "/quit" => Self::Quit,
            "home" => Self::Home,
            "menu" => Self::Menu,
            "go" => Self::Go(parse_screen(rest)?),
            "result" => {
                if rest.is_empty() {
                    return Err("Usage: result <assessment id>".into());
                }
                Self::Go(Screen::Result(AssessmentId::new(rest)))
            }
            "show" => Self::Show,
            "reload" => Self::Reload,
            "forget" => Self::Forget,
            "name" => Self::Name(rest.to_string()),
            "age" => Self::Age(rest.parse()?),
            "occupation" => Self::Occupation(rest.parse()?),
            "set" => {
                let (field, value) = rest
                    .split_once(' ')
                    .ok_or("Usage: set <field> <value>")?;
                Self::Set(field.parse()?, parse_number(value)?)
            }
            "submit" => Self::Submit,
            "restart" => Self::Restart,
            "plan" | "generate" => Self::GeneratePlan,
            "regenerate" => Self::Regenerate,
            "toggle" => {
                let (category, index) = rest
                    .split_once(' ')
                    .ok_or("Usage: toggle <daily|weekly> <n>")?;
                let index = index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("Not a position: {index}"))?;
                Self::Toggle(category.parse()?, index)
            }
            "add" => Self::OpenForm,
            "score" => Self::Score(parse_number(rest)?),
            "note" => Self::Note(rest.to_string()),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            other => return Err(format!("Unknown command: {other}. Type 'help'.")),
        };
        Ok(cmd)
    }
}

fn parse_screen(name: &str) -> Result<Screen, String> {
    match name.to_ascii_lowercase().as_str() {
        "home" => Ok(Screen::Home),
        "assessment" | "intake" => Ok(Screen::Assessment),
        "recovery" | "plan" => Ok(Screen::Recovery),
        "progress" => Ok(Screen::Progress),
        other => Err(format!("Unknown screen: {other}")),
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("Not a number: {}", raw.trim()))
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// All screen controllers of one interactive session.
pub struct Session {
    api: Arc<dyn AssessmentApi>,
    identity: Arc<IdentityStore>,
    screen: Screen,
    intake: IntakeWizard,
    result: Option<ResultPresenter>,
    recovery: Option<RecoveryPlanManager>,
    progress: Option<ProgressTracker>,
}

impl Session {
    /// Validate `config`, restore the saved identity and connect to the
    /// configured Assessment API.
    pub fn open(config: &ClientConfig) -> error::Result<Self> {
        config.validate()?;
        let identity = Arc::new(IdentityStore::open(config.identity_path())?);
        let api: Arc<dyn AssessmentApi> = Arc::new(HttpAssessmentApi::from_config(config));
        Ok(Self::new(api, identity))
    }

    pub fn new(api: Arc<dyn AssessmentApi>, identity: Arc<IdentityStore>) -> Self {
        let intake = IntakeWizard::new(api.clone(), identity.clone());
        Self {
            api,
            identity,
            screen: Screen::Home,
            intake,
            result: None,
            recovery: None,
            progress: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Run one command and return the text to print.
    pub async fn handle(&mut self, cmd: Command) -> (Flow, String) {
        let out = match cmd {
            Command::Quit => return (Flow::Quit, "Goodbye.".to_string()),
            Command::Help => HELP.to_string(),
            Command::Home => self.enter(Screen::Home).await,
            Command::Menu => render_menu(self.identity.is_present()),
            Command::Go(target) => self.enter(target).await,
            Command::Show => self.render(),
            Command::Reload => {
                let current = self.screen.clone();
                self.enter(current).await
            }
            Command::Forget => match self.identity.clear() {
                Ok(()) => {
                    self.intake.restart();
                    self.recovery = None;
                    self.progress = None;
                    "Session forgotten.".to_string()
                }
                Err(e) => format!("Error: {e}"),
            },
            cmd => self.handle_screen(cmd).await,
        };
        (Flow::Continue, out)
    }

    async fn handle_screen(&mut self, cmd: Command) -> String {
        match (self.screen.clone(), cmd) {
            (Screen::Assessment, cmd) => self.handle_intake(cmd).await,
            (Screen::Result(_), Command::GeneratePlan) => {
                let Some(result) = self.result.as_mut() else {
                    return "No result loaded.".to_string();
                };
                match result.generate_plan().await {
                    Ok(()) => match result.handoff() {
                        Some(next) => self.enter(next).await,
                        None => self.render(),
                    },
                    Err(e) => failure(&e, result.error()),
                }
            }
            (Screen::Recovery, cmd) => self.handle_recovery(cmd).await,
            (Screen::Progress, cmd) => self.handle_progress(cmd).await,
            (screen, cmd) => format!("'{cmd:?}' is not available on {}.", screen.title()),
        }
    }

    async fn handle_intake(&mut self, cmd: Command) -> String {
        let wizard = &mut self.intake;
        let outcome = match cmd {
            Command::Name(name) => {
                wizard.set_name(name);
                Ok(())
            }
            Command::Age(age) => {
                wizard.set_age_range(age);
                Ok(())
            }
            Command::Occupation(occupation) => {
                wizard.set_occupation_type(occupation);
                Ok(())
            }
            Command::Set(field, value) => {
                let stored = wizard.set_response(field, value);
                return format!("{} = {stored}", field.label());
            }
            Command::Restart => {
                wizard.restart();
                Ok(())
            }
            Command::Submit => match wizard.stage() {
                IntakeStage::CollectingProfile => wizard.submit_profile().await,
                IntakeStage::CollectingResponses => wizard.submit_responses().await,
                IntakeStage::Submitted => Ok(()),
            },
            other => return format!("'{other:?}' is not available on Assessment."),
        };
        if let Err(e) = outcome {
            return failure(&e, self.intake.error());
        }
        match self.intake.handoff().cloned() {
            Some(id) if self.intake.stage().is_terminal() => {
                // Hand the new assessment to the result screen and start a
                // fresh wizard for the next visit.
                self.intake.restart();
                self.enter(Screen::Result(id)).await
            }
            _ => render_intake(&self.intake),
        }
    }

    async fn handle_recovery(&mut self, cmd: Command) -> String {
        let Some(manager) = self.recovery.as_mut() else {
            return "Recovery plan not loaded.".to_string();
        };
        let outcome = match cmd {
            Command::GeneratePlan => manager.generate().await,
            Command::Regenerate => manager.regenerate().await,
            Command::Toggle(category, index) => manager.toggle(category, index).map(|_| ()),
            other => return format!("'{other:?}' is not available on Recovery Plan."),
        };
        match outcome {
            Ok(()) => render_recovery(manager),
            Err(e) => failure(&e, manager.error()),
        }
    }

    async fn handle_progress(&mut self, cmd: Command) -> String {
        let Some(tracker) = self.progress.as_mut() else {
            return "Progress not loaded.".to_string();
        };
        match cmd {
            Command::OpenForm => tracker.open_form(),
            Command::Score(score) => {
                tracker.open_form();
                tracker.form_mut().set_weekly_score(score);
            }
            Command::Note(note) => {
                tracker.open_form();
                tracker.form_mut().set_notes(note);
            }
            Command::Cancel => tracker.cancel_form(),
            Command::Save => {
                if let Err(e) = tracker.add_record().await {
                    return failure(&e, tracker.error());
                }
            }
            other => return format!("'{other:?}' is not available on Progress."),
        }
        render_progress(tracker)
    }

    /// Guard, then build and load the target screen.
    pub async fn enter(&mut self, target: Screen) -> String {
        let mut out = String::new();
        let target = match workflow::navigate(target, &self.identity) {
            Navigation::Enter(screen) => screen,
            redirect @ Navigation::RedirectToIntake => {
                out.push_str("Please complete an assessment first.\n");
                redirect.destination()
            }
        };
        tracing::debug!(screen = %target, "Entering screen");
        self.screen = target.clone();

        let loaded = match &target {
            Screen::Home | Screen::Assessment => Ok(()),
            Screen::Result(id) => {
                let presenter = self.result.insert(ResultPresenter::new(
                    self.api.clone(),
                    self.identity.clone(),
                    id.clone(),
                ));
                presenter.load().await
            }
            Screen::Recovery => {
                let manager = self
                    .recovery
                    .insert(RecoveryPlanManager::new(self.api.clone(), self.identity.clone()));
                manager.load().await
            }
            Screen::Progress => {
                let tracker = self
                    .progress
                    .insert(ProgressTracker::new(self.api.clone(), self.identity.clone()));
                tracker.load().await
            }
        };
        if let Err(e) = loaded {
            tracing::debug!(error = %e, "Screen load failed");
        }
        out.push_str(&self.render());
        out
    }

    /// Render the current screen.
    pub fn render(&self) -> String {
        match &self.screen {
            Screen::Home => render_menu(self.identity.is_present()),
            Screen::Assessment => render_intake(&self.intake),
            Screen::Result(_) => self
                .result
                .as_ref()
                .map(render_result)
                .unwrap_or_else(|| "No result loaded.".to_string()),
            Screen::Recovery => self
                .recovery
                .as_ref()
                .map(render_recovery)
                .unwrap_or_else(|| "Recovery plan not loaded.".to_string()),
            Screen::Progress => self
                .progress
                .as_ref()
                .map(render_progress)
                .unwrap_or_else(|| "Progress not loaded.".to_string()),
        }
    }
}

fn failure(err: &ScreenError, banner: Option<&str>) -> String {
    format!("Error: {}", banner.map(str::to_string).unwrap_or_else(|| err.to_string()))
}

fn render_menu(has_identity: bool) -> String {
    let mut out = String::from("== Burnout Tracker ==\n");
    for screen in workflow::menu(has_identity) {
        let _ = writeln!(out, "  - {}", screen.title());
    }
    out.push_str("Type 'help' for commands.");
    out
}

fn render_intake(wizard: &IntakeWizard) -> String {
    let mut out = String::from("== Assessment ==\n");
    if let Some(error) = wizard.error() {
        let _ = writeln!(out, "! {error}");
    }
    match wizard.stage() {
        IntakeStage::CollectingProfile => {
            let profile = wizard.profile();
            let _ = writeln!(out, "Step 1 of 2: your profile");
            let _ = writeln!(out, "  name:       {}", profile.name);
            let _ = writeln!(out, "  age:        {}", profile.age_range);
            let _ = writeln!(out, "  occupation: {}", profile.occupation_type);
        }
        IntakeStage::CollectingResponses => {
            let _ = writeln!(out, "Step 2 of 2: how has your week been?");
            for field in ResponseField::ALL {
                let _ = writeln!(
                    out,
                    "  {:<22} {:<28} {}",
                    field.key(),
                    field.label(),
                    field.display_value(wizard.responses())
                );
            }
        }
        IntakeStage::Submitted => {
            if let Some(summary) = wizard.submitted() {
                let _ = writeln!(
                    out,
                    "Submitted: score {:.1} ({})",
                    summary.burnout_score, summary.burnout_stage
                );
            }
        }
    }
    if wizard.is_busy() {
        out.push_str("Submitting...\n");
    }
    out.push_str("Type 'submit' to continue.");
    out
}

fn render_result(presenter: &ResultPresenter) -> String {
    let mut out = String::from("== Your Burnout Assessment Result ==\n");
    match presenter.state() {
        ResultState::Loading => out.push_str("Loading result..."),
        ResultState::Failed(msg) => {
            let _ = write!(out, "! {msg}");
        }
        ResultState::Loaded(_) => {
            let Some(view) = presenter.view() else {
                return out;
            };
            let _ = writeln!(out, "Score: {} [{}]", view.score, view.band.as_str());
            let _ = writeln!(out, "Stage: {} [{}]", view.stage, view.severity.as_str());
            if !view.description.is_empty() {
                let _ = writeln!(out, "{}", view.description);
            }
            if !view.explanation.is_empty() {
                let _ = writeln!(out, "\n{}", view.explanation);
            }
            if !view.factors.is_empty() {
                out.push_str("\nContributing factors:\n");
                for factor in &view.factors {
                    let filled = (factor.width / 5.0).round() as usize;
                    let _ = writeln!(
                        out,
                        "  {:<22} {:<20} {:>5.1}% ({:?})",
                        factor.label,
                        "#".repeat(filled),
                        factor.percentage,
                        factor.urgency
                    );
                }
            }
            if let Some(error) = presenter.error() {
                let _ = writeln!(out, "! {error}");
            }
            let _ = write!(out, "\n{}\nType 'plan' to generate a recovery plan.", view.disclaimer);
        }
    }
    out
}

fn render_recovery(manager: &RecoveryPlanManager) -> String {
    let mut out = String::from("== Recovery Plan ==\n");
    if let Some(error) = manager.error() {
        let _ = writeln!(out, "! {error}");
    }
    match manager.state() {
        RecoveryState::Loading => out.push_str("Loading recovery plan..."),
        RecoveryState::NoAssessment => out.push_str(
            "Please complete an assessment first to generate a personalized recovery plan.\n\
             Type 'go assessment'.",
        ),
        RecoveryState::NoPlan => out.push_str(
            "No recovery plan found. Generate one based on your latest assessment.\n\
             Type 'generate'.",
        ),
        RecoveryState::Failed(msg) => {
            let _ = write!(out, "! {msg}");
        }
        RecoveryState::Ready { .. } => {
            let Some(view) = manager.view() else {
                return out;
            };
            let _ = writeln!(out, "{}", view.generated_on);
            let _ = writeln!(out, "Disclaimer: {}", view.disclaimer);
            if let Some(notes) = &view.caution_notes {
                out.push_str("Important Notes:\n");
                for note in notes {
                    let _ = writeln!(out, "  ! {note}");
                }
            }
            for (title, items) in [
                ("Daily Actions", &view.daily_actions),
                ("Weekly Goals", &view.weekly_goals),
            ] {
                let _ = writeln!(out, "\n{title}:");
                for (index, item) in items.iter().enumerate() {
                    let mark = if item.done { 'x' } else { ' ' };
                    let _ = writeln!(out, "  [{mark}] {index}. {}", item.text);
                }
            }
            if !view.behavioral_suggestions.is_empty() {
                out.push_str("\nBehavioral Suggestions:\n");
                for suggestion in &view.behavioral_suggestions {
                    let _ = writeln!(out, "  - {suggestion}");
                }
            }
            out.push_str("\nType 'toggle daily <n>' to mark an item, 'regenerate' for a new plan.");
        }
    }
    out
}

fn render_progress(tracker: &ProgressTracker) -> String {
    let mut out = String::from("== Progress Tracking ==\n");
    if let Some(error) = tracker.error() {
        let _ = writeln!(out, "! {error}");
    }
    match tracker.state() {
        ProgressState::Loading => out.push_str("Loading progress data..."),
        ProgressState::Empty => out.push_str(
            "No progress data available. Please complete an assessment first.\n\
             Type 'go assessment'.",
        ),
        ProgressState::Failed(msg) => {
            let _ = write!(out, "! {msg}");
        }
        ProgressState::Ready(_) => {
            let Some(view) = tracker.view() else {
                return out;
            };
            let _ = writeln!(out, "Current score: {}  Stage: {}", view.current_score, view.current_stage);
            if let Some(trend) = &view.trend {
                let _ = writeln!(out, "\n{} Trend: {} ({:?})", trend.indicator, trend.label, trend.tone);
                if let Some(change) = &trend.change {
                    let _ = writeln!(out, "Score change: {change} points");
                }
                let _ = writeln!(out, "{}", trend.recommendation);
            }
            out.push_str("\nBurnout Score History:\n");
            match view.chart_notice {
                Some(notice) => {
                    let _ = writeln!(out, "  {notice}");
                }
                None => {
                    for point in &view.chart {
                        let _ = writeln!(
                            out,
                            "  {:<8} {:>5.1}  {}",
                            point.label, point.score, point.date
                        );
                    }
                }
            }
            if !view.records.is_empty() {
                out.push_str("\nProgress Records:\n");
                for record in &view.records {
                    let _ = write!(out, "  Score: {}  {}", record.score, record.date);
                    if let Some(notes) = &record.notes {
                        let _ = write!(out, "  \"{notes}\"");
                    }
                    out.push('\n');
                }
            }
            let form = tracker.form();
            if form.open {
                let _ = writeln!(
                    out,
                    "\nNew record: weekly score {}, notes: {}",
                    form.weekly_score(),
                    if form.notes().is_empty() { "(none)" } else { form.notes() }
                );
                out.push_str("Type 'save' or 'cancel'.");
            } else {
                out.push_str("\nType 'add' to record this week's score.");
            }
        }
    }
    out
}

/// Read commands from `input` until EOF or `quit`, printing each response.
pub async fn run<R>(session: &mut Session, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("{}", session.render());
    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        let (flow, out) = match Command::parse(line) {
            Ok(cmd) => session.handle(cmd).await,
            Err(e) => (Flow::Continue, e),
        };
        println!("\n{out}\n");
        if flow == Flow::Quit {
            break;
        }
        eprint!("> ");
    }
    Ok(())
}
