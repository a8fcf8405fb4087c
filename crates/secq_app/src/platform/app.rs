use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{bail, Context};
use secq_core::{is_free_model, update, AiModel, AppState, Effect, Msg, Page, Settings};
use secq_engine::{EngineHandle, ResultsStore};
use secq_logging::{secq_debug, secq_info};

use super::config::{ClientConfig, BASE_URL_ENV};
use super::effects::EffectRunner;
use super::files;
use super::ui::render::render;
use super::ui::terminal::TerminalSurface;
use super::ui::Surface;
use crate::cli::{Cli, Command};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    config.override_base_url(std::env::var(BASE_URL_ENV).ok(), cli.base_url);
    secq_logging::initialize(config.log_destination, config.level_filter()?);
    secq_info!("secq client talking to {}", config.base_url);

    let engine =
        EngineHandle::connect(&config.backend_settings()).context("starting request engine")?;
    let runner = EffectRunner::new(engine, ResultsStore::in_dir(&config.store_dir));
    let assume_yes = matches!(cli.command, Command::Results { yes: true, .. });
    let mut app = App::new(config.settings(), runner, TerminalSurface::new(assume_yes));

    let outcome = execute(&mut app, cli.command);
    app.leave();
    outcome
}

fn execute<S: Surface>(app: &mut App<S>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Files { paths } => {
            let candidates = files::candidates(&paths)?;
            app.open(Page::Upload);
            if !candidates.is_empty() {
                app.dispatch(Msg::FilesChosen(candidates));
                app.settle();
            }
        }
        Command::Remove { name } => {
            app.open(Page::Upload);
            app.dispatch(Msg::RemoveFileClicked { name });
            app.settle();
        }
        Command::Ask {
            model,
            api_key,
            questions,
        } => {
            let model_msgs = model_messages(&model)?;
            app.open(Page::Questions);
            for msg in model_msgs {
                app.dispatch(msg);
            }
            if let Some(key) = api_key {
                app.dispatch(Msg::ApiKeyChanged(key));
            }
            app.dispatch(Msg::QuestionsSeeded(questions));
            app.dispatch(Msg::RunAnalysisClicked);
            app.settle();
        }
        Command::Suggest { text } => {
            app.open(Page::Questions);
            app.dispatch(Msg::AddQuestionClicked);
            let question = app
                .state()
                .view()
                .composer
                .questions
                .last()
                .map(|row| row.id)
                .context("question input was not added")?;
            app.dispatch(Msg::QuestionEdited { question, text });
            app.settle();
        }
        Command::Results { clear, .. } => {
            app.open(Page::Results);
            if clear {
                app.dispatch(Msg::ClearResultsClicked);
                app.settle();
            }
        }
    }
    Ok(())
}

/// Selector messages for a `--model` value: a free model name or a paid model.
fn model_messages(model: &str) -> anyhow::Result<Vec<Msg>> {
    let value = model.trim().to_ascii_lowercase();
    if is_free_model(&value) {
        return Ok(vec![
            Msg::ModelChanged(AiModel::Free),
            Msg::FreeModelSelected(value),
        ]);
    }
    match AiModel::from_value(&value) {
        Some(selected) => Ok(vec![Msg::ModelChanged(selected)]),
        None => bail!("unknown model {model:?}; expected mpnet, bart, t5, claude or chatgpt"),
    }
}

/// One page session: the state machine, its effect runner and the surface it draws on.
pub(crate) struct App<S: Surface> {
    state: AppState,
    runner: EffectRunner,
    surface: S,
    inbox: VecDeque<Msg>,
    last_frame: Vec<String>,
}

impl<S: Surface> App<S> {
    pub(crate) fn new(settings: Settings, runner: EffectRunner, surface: S) -> Self {
        Self {
            state: AppState::with_settings(settings),
            runner,
            surface,
            inbox: VecDeque::new(),
            last_frame: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    /// Loads `page` and waits for its initial loads.
    pub(crate) fn open(&mut self, page: Page) {
        self.dispatch(Msg::PageLoaded(page));
        self.settle();
    }

    pub(crate) fn leave(&mut self) {
        if self.state.page().is_some() {
            self.dispatch(Msg::PageLeft);
        }
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        while let Some(msg) = self.inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            for effect in effects {
                self.apply(effect);
            }
        }
        self.render_if_due();
    }

    /// Pumps engine answers until nothing waits on a request or a timer.
    pub(crate) fn settle(&mut self) {
        while !self.state.is_settled() {
            if let Some(msg) = self.runner.next_msg(TICK) {
                self.dispatch(msg);
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Alert { message } => self.surface.alert(&message),
            Effect::ConfirmClearResults { prompt } => {
                if self.surface.confirm(&prompt) {
                    self.inbox.push_back(Msg::ClearResultsConfirmed);
                } else {
                    secq_debug!("Clearing results declined");
                }
            }
            Effect::ReloadPage => self.reload(),
            other => {
                if let Some(msg) = self.runner.run(other) {
                    self.inbox.push_back(msg);
                }
            }
        }
    }

    fn reload(&mut self) {
        let Some(page) = self.state.page() else {
            return;
        };
        secq_info!("Reloading {:?} page", page);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, Msg::PageLeft);
        for effect in effects {
            self.apply(effect);
        }
        self.state = state.reloaded();
        self.inbox.clear();
        self.inbox.push_back(Msg::PageLoaded(page));
    }

    // Intermediate frames while requests are in flight are skipped, except
    // during an analysis run where the busy button is shown.
    fn render_if_due(&mut self) {
        let due = self.state.is_settled() || self.state.active_run().is_some();
        if !due || !self.state.consume_dirty() {
            return;
        }
        let frame = render(&self.state.view());
        if frame != self.last_frame {
            self.surface.render(&frame);
            self.last_frame = frame;
        }
    }
}
