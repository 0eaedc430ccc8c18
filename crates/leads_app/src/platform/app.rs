use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use engine_logging::engine_info;
use leads_core::{Generation, Msg, PageDelta, ResultStreamController, ResultView};
use uuid::Uuid;

use super::config::{self, AppConfig};
use super::effects::{EffectDispatch, EffectRunner};
use super::export::export_records;
use super::logging::{self, LogDestination};
use super::ui::commands::{parse_command, Command};
use super::ui::{layout, render};
use crate::cli::CliArgs;

/// Everything the main loop reacts to, delivered over one channel.
pub enum AppInput {
    Engine(Msg),
    Command(Command),
    UnknownCommand(String),
    InputClosed,
}

type Controller = ResultStreamController<fn(&ResultView)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub fn run_app(args: CliArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args).context("loading configuration")?;
    if args.print_config {
        println!("{}", config.to_ron());
        return Ok(());
    }
    if let Some(destination) = LogDestination::from_flags(config.log_to_file, args.log_terminal) {
        logging::initialize(destination);
    }

    let (input_tx, input_rx) = mpsc::channel();
    spawn_stdin_reader(input_tx.clone());
    let runner = EffectRunner::new(config.api_settings(), input_tx);

    println!(
        "{}",
        layout::banner(&config.base_url, config.campaign_ids.len(), config.use_stream)
    );
    print_lines(&layout::help_lines());

    let mut app = AppLoop::start(config, runner)?;
    while let Ok(input) = input_rx.recv() {
        if app.handle_input(input)? == Flow::Exit {
            break;
        }
    }
    app.shutdown();
    Ok(())
}

/// Owns the current run and reacts to one input at a time.
struct AppLoop<R: EffectDispatch> {
    config: AppConfig,
    runner: R,
    generation: Generation,
    controller: Controller,
    input_closed: bool,
}

impl<R: EffectDispatch> AppLoop<R> {
    fn start(config: AppConfig, runner: R) -> anyhow::Result<Self> {
        let generation: Generation = 1;
        let controller = start_run(&config, generation, &runner)?;
        Ok(Self {
            config,
            runner,
            generation,
            controller,
            input_closed: false,
        })
    }

    fn handle_input(&mut self, input: AppInput) -> anyhow::Result<Flow> {
        match input {
            AppInput::Engine(msg) => self.runner.run(self.controller.handle(msg)),
            AppInput::Command(Command::NextPage) => step_page(
                &mut self.controller,
                PageDelta::Next,
                "Already on the last page",
            ),
            AppInput::Command(Command::PreviousPage) => step_page(
                &mut self.controller,
                PageDelta::Previous,
                "Already on the first page",
            ),
            AppInput::Command(Command::Redraw) => print_view(&self.controller.current_view()),
            AppInput::Command(Command::Export) => self.export(),
            AppInput::Command(Command::Restart) => {
                self.shutdown();
                self.generation += 1;
                self.controller = start_run(&self.config, self.generation, &self.runner)?;
            }
            AppInput::Command(Command::Help) => print_lines(&layout::help_lines()),
            AppInput::Command(Command::Quit) => return Ok(Flow::Exit),
            AppInput::UnknownCommand(text) => {
                println!("Unknown command {text:?}; type h for help")
            }
            AppInput::InputClosed => self.input_closed = true,
        }

        // Without a keyboard, stay only until the run settles.
        if self.input_closed && self.controller.channel().is_terminal() {
            return Ok(Flow::Exit);
        }
        Ok(Flow::Continue)
    }

    fn export(&self) {
        let records = self.controller.state().records();
        match export_records(&self.config.export_dir, records) {
            Ok(files) => println!(
                "Exported {} result(s) to {} and {}",
                records.len(),
                files.json.display(),
                files.csv.display()
            ),
            Err(err) => eprintln!("Export failed: {err}"),
        }
    }

    /// Close the current run's live channel if it is still open.
    fn shutdown(&self) {
        if !self.controller.channel().is_terminal() {
            self.runner.abandon(self.controller.generation());
        }
    }
}

fn start_run(
    config: &AppConfig,
    generation: Generation,
    runner: &impl EffectDispatch,
) -> anyhow::Result<Controller> {
    let mut controller: Controller = ResultStreamController::new(
        generation,
        config.page_size,
        print_view as fn(&ResultView),
    );
    let request_id = config.use_stream.then(|| Uuid::new_v4().to_string());
    engine_info!(
        "Starting run {} for {} campaign(s)",
        generation,
        config.campaign_ids.len()
    );
    let effects = controller
        .start(config.campaign_ids.clone(), request_id)
        .context("starting run")?;
    runner.run(effects);
    Ok(controller)
}

fn step_page(controller: &mut Controller, delta: PageDelta, at_edge: &str) {
    let before = controller.current_view().page;
    if controller.request_page(delta) == before {
        println!("{at_edge}");
    }
}

fn print_view(view: &ResultView) {
    println!();
    print_lines(&render::render(view));
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let input = match parse_command(&line) {
                Some(command) => AppInput::Command(command),
                None => AppInput::UnknownCommand(line.trim().to_string()),
            };
            if tx.send(input).is_err() {
                return;
            }
        }
        let _ = tx.send(AppInput::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::platform::export::EXPORT_FILENAME;
    use leads_core::{ChannelState, Effect};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingRunner {
        effects: RefCell<Vec<Effect>>,
        abandoned: RefCell<Vec<Generation>>,
    }

    impl EffectDispatch for RecordingRunner {
        fn run(&self, effects: Vec<Effect>) {
            self.effects.borrow_mut().extend(effects);
        }

        fn abandon(&self, generation: Generation) {
            self.abandoned.borrow_mut().push(generation);
        }
    }

    fn streaming_app(export_dir: &std::path::Path) -> AppLoop<RecordingRunner> {
        let config = AppConfig {
            campaign_ids: vec!["c1".to_string()],
            use_stream: true,
            export_dir: export_dir.to_path_buf(),
            ..AppConfig::default()
        };
        AppLoop::start(config, RecordingRunner::default()).unwrap()
    }

    fn live(generation: Generation, payload: serde_json::Value) -> AppInput {
        AppInput::Engine(Msg::StreamMessage {
            generation,
            data: payload.to_string(),
        })
    }

    #[test]
    fn first_run_opens_a_live_channel() {
        let dir = tempfile::tempdir().unwrap();
        let app = streaming_app(dir.path());
        let effects = app.runner.effects.borrow();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::OpenStream { generation: 1, .. }));
    }

    #[test]
    fn input_closed_waits_for_the_run_to_finish() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = streaming_app(dir.path());

        assert_eq!(app.handle_input(AppInput::InputClosed).unwrap(), Flow::Continue);
        let flow = app
            .handle_input(live(1, json!({"status": "processing", "results": [{"Name": "A"}]})))
            .unwrap();
        assert_eq!(flow, Flow::Continue);

        let flow = app
            .handle_input(live(1, json!({"status": "completed"})))
            .unwrap();
        assert_eq!(flow, Flow::Exit);
        assert_eq!(
            app.runner.effects.borrow().last(),
            Some(&Effect::CloseStream { generation: 1 })
        );
    }

    #[test]
    fn input_closed_after_completion_exits_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = streaming_app(dir.path());
        let flow = app
            .handle_input(live(1, json!({"is_final": true, "results": [{"Name": "A"}]})))
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(*app.controller.channel(), ChannelState::Completed);

        assert_eq!(app.handle_input(AppInput::InputClosed).unwrap(), Flow::Exit);
    }

    #[test]
    fn restart_abandons_the_old_run_and_bumps_the_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = streaming_app(dir.path());

        let flow = app.handle_input(AppInput::Command(Command::Restart)).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(app.generation, 2);
        assert_eq!(app.controller.generation(), 2);
        assert_eq!(*app.runner.abandoned.borrow(), vec![1]);
        assert!(matches!(
            app.runner.effects.borrow().last(),
            Some(Effect::OpenStream { generation: 2, .. })
        ));

        // Late events from the abandoned run change nothing.
        app.handle_input(live(1, json!({"is_final": true, "results": [{"Name": "Old"}]})))
            .unwrap();
        assert!(app.controller.state().records().is_empty());
        assert_eq!(
            *app.controller.channel(),
            ChannelState::Streaming {
                consecutive_errors: 0
            }
        );
    }

    #[test]
    fn export_writes_the_full_result_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = streaming_app(dir.path());
        let results: Vec<_> = (0..7)
            .map(|i| json!({"Name": format!("Lead {i}")}))
            .collect();
        app.handle_input(live(1, json!({"status": "processing", "results": results})))
            .unwrap();

        let flow = app.handle_input(AppInput::Command(Command::Export)).unwrap();
        assert_eq!(flow, Flow::Continue);

        let exported: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(EXPORT_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(exported.as_array().map(Vec::len), Some(7));
    }

    #[test]
    fn quit_exits_and_shutdown_closes_an_open_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = streaming_app(dir.path());
        assert_eq!(
            app.handle_input(AppInput::Command(Command::Quit)).unwrap(),
            Flow::Exit
        );
        app.shutdown();
        assert_eq!(*app.runner.abandoned.borrow(), vec![1]);
    }
}
