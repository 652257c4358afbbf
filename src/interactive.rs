//! Interactive REPL
//!
//! Lines are read by rustyline on a dedicated thread and forwarded into the
//! app's event channel, so typing, timer ticks and coach replies are all
//! handled by one loop.

use anyhow::Result;
use crossterm::{execute, style::{Color, Print, ResetColor, SetForegroundColor}};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::Helper;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app::{award_line, App, AppEvent, Notice};
use crate::coach::Coach;
use crate::config::Config;
use crate::features::quest::QuestState;
use crate::features::rescue::RescueMode;
use crate::features::social::SCENARIOS;
use crate::features::study::StepToggle;
use crate::features::FlowError;
use crate::progress::render_weekly_activity;
use crate::types::{Mood, Sender, View};

const COMMANDS: &[&str] = &[
    "/home", "/study", "/social", "/quest", "/garden", "/rescue", "/end", "/status", "/help", "/quit", "/exit",
];

/// Slash-command completion and hints
struct SproutHelper;

impl Completer for SproutHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let partial = &line[..pos];
        if !partial.starts_with('/') {
            return Ok((pos, Vec::new()));
        }
        let matches = COMMANDS
            .iter()
            .filter(|c| c.starts_with(partial))
            .map(|c| Pair {
                display: c.to_string(),
                replacement: c[partial.len()..].to_string(),
            })
            .collect();
        Ok((pos, matches))
    }
}

impl Hinter for SproutHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if !line.starts_with('/') || pos < line.len() {
            return None;
        }
        COMMANDS
            .iter()
            .find(|c| c.starts_with(line) && **c != line)
            .map(|c| c[line.len()..].to_string())
    }
}

impl Validator for SproutHelper {
    fn validate(&self, _ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Highlighter for SproutHelper {}

impl Helper for SproutHelper {}

fn print_colored(text: &str, color: Color) {
    let _ = execute!(io::stdout(), SetForegroundColor(color), Print(text), ResetColor);
}

fn print_dim(text: &str) {
    print_colored(&format!("{}\n", text), Color::DarkGrey);
}

fn print_success(text: &str) {
    print_colored(&format!("{}\n", text), Color::Green);
}

fn print_info(text: &str) {
    print_colored(&format!("{}\n", text), Color::Cyan);
}

fn print_error(text: &str) {
    print_colored(&format!("✗ {}\n", text), Color::Red);
}

fn print_header(text: &str) {
    print_colored(&format!("\n── {} ──\n", text), Color::Cyan);
}

fn print_banner() {
    println!();
    print_success(&format!("🌱 {}", crate::info()));
    print_dim("Small steps, every day. Type /help for commands.");
    println!();
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.dim} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Thinking...");
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Read lines on a plain thread so exiting never waits on a blocked read
fn spawn_input_thread(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        let config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .edit_mode(rustyline::EditMode::Emacs)
            .auto_add_history(true)
            .build();
        let mut rl = match rustyline::Editor::<SproutHelper, rustyline::history::DefaultHistory>::with_config(config) {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Could not start line editor: {}", e);
                let _ = tx.send(AppEvent::InputClosed);
                return;
            }
        };
        rl.set_helper(Some(SproutHelper));

        loop {
            match rl.readline("\x1b[32m❯\x1b[0m ") {
                Ok(line) => {
                    if tx.send(AppEvent::Input(line)).is_err() {
                        break;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    let _ = tx.send(AppEvent::InputClosed);
                    break;
                }
                Err(e) => {
                    tracing::error!("Input error: {}", e);
                    let _ = tx.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    });
}

enum Flow {
    Continue,
    Quit,
}

/// 1-based user number to 0-based index
fn index_arg(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

#[derive(Debug, PartialEq, Eq)]
enum SocialInput<'a> {
    Play(Option<usize>),
    Say(&'a str),
}

/// Inside a scenario every plain line is dialogue
fn social_input(input: &str, in_scenario: bool) -> SocialInput<'_> {
    if in_scenario {
        return SocialInput::Say(input);
    }
    match input.split_once(' ').unwrap_or((input, "")) {
        ("play", arg) => SocialInput::Play(index_arg(arg)),
        _ => SocialInput::Say(input),
    }
}

struct Repl {
    app: App,
    pending: usize,
    spinner: Option<ProgressBar>,
}

impl Repl {
    fn started(&mut self, result: Result<(), FlowError>) {
        match result {
            Ok(()) => {
                self.pending += 1;
                if self.spinner.is_none() {
                    self.spinner = Some(create_spinner());
                }
            }
            Err(e) => print_error(&e.to_string()),
        }
    }

    fn received(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            if let Some(spinner) = self.spinner.take() {
                spinner.finish_and_clear();
            }
        }
    }

    fn show_notice(&self, notice: &Notice) {
        match notice {
            Notice::RescueOffer => print_info(&notice.to_string()),
            Notice::Praise(_) | Notice::FocusComplete(_) => print_success(&notice.to_string()),
            _ => println!("{}", notice),
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let input = line.trim();
        if input.is_empty() {
            return Flow::Continue;
        }

        if self.app.rescue_offer_pending() {
            match input.to_lowercase().as_str() {
                "y" | "yes" => {
                    self.app.answer_rescue_offer(true);
                    self.print_rescue();
                    return Flow::Continue;
                }
                "n" | "no" => {
                    self.app.answer_rescue_offer(false);
                    return Flow::Continue;
                }
                _ => {}
            }
        }

        if input.starts_with('/') {
            return self.handle_command(input);
        }

        if self.app.rescue().is_open() {
            self.rescue_verb(input);
            return Flow::Continue;
        }

        match self.app.view() {
            View::Dashboard => self.dashboard_verb(input),
            View::Study => self.study_verb(input),
            View::Social => self.social_verb(input),
            View::Quest => self.quest_verb(input),
            View::Garden => self.print_garden(),
        }
        Flow::Continue
    }

    fn handle_command(&mut self, input: &str) -> Flow {
        let view = match input {
            "/quit" | "/exit" => return Flow::Quit,
            "/help" => {
                self.print_help();
                return Flow::Continue;
            }
            "/status" => {
                self.print_status();
                return Flow::Continue;
            }
            "/rescue" => {
                self.app.open_rescue();
                self.print_rescue();
                return Flow::Continue;
            }
            "/end" => {
                if self.app.view() == View::Social && self.app.social().scenario().is_some() {
                    self.app.end_scenario();
                    self.print_social();
                } else {
                    print_error("No scenario to leave");
                }
                return Flow::Continue;
            }
            "/home" => View::Dashboard,
            "/study" => View::Study,
            "/social" => View::Social,
            "/quest" => View::Quest,
            "/garden" => View::Garden,
            other => {
                print_error(&format!("Unknown command: {} (try /help)", other));
                return Flow::Continue;
            }
        };
        self.app.set_view(view);
        self.print_view();
        Flow::Continue
    }

    fn print_view(&self) {
        print_header(self.app.view().title());
        match self.app.view() {
            View::Dashboard => self.print_dashboard(),
            View::Study => self.print_study(),
            View::Social => self.print_social(),
            View::Quest => self.print_quest(),
            View::Garden => self.print_garden(),
        }
    }

    fn print_status(&self) {
        let p = self.app.progress();
        println!(
            "Level {}  ·  {}/{} XP  ·  🔥 {} day streak  ·  {} tasks done",
            p.level, p.current_xp, p.next_level_xp, p.streak, p.total_tasks_completed
        );
    }

    fn print_help(&self) {
        print_header("Commands");
        println!("  /home /study /social /quest /garden   switch view");
        println!("  /rescue                               open the rescue panel");
        println!("  /status  /help  /quit");
        println!();
        if self.app.rescue().is_open() {
            println!("  Rescue: breathe, journal, message, tip, back, close");
            println!("  Journal: type to write, 'save' to let it go");
            println!("  Message: to <name>, about <context>, draft, regenerate, copy");
            return;
        }
        match self.app.view() {
            View::Dashboard => {
                println!("  mood <name|1-5>   how are you feeling?");
                println!("  energy <1-10>     how much energy do you have?");
                println!("  go                build today's routine");
                println!("  done <n>          complete a task");
                println!("  new               pick a new mood");
            }
            View::Study => {
                println!("  start | pause | reset   focus timer");
                println!("  timer                   show remaining time");
                println!("  goal <text>             break a goal into steps");
                println!("  step <n>                toggle a step");
                println!("  clear                   enter a new goal");
            }
            View::Social => {
                println!("  play <n>          start a scenario");
                println!("  <anything>        say it in the scenario");
                println!("  /end              leave the scenario");
            }
            View::Quest => {
                println!("  missions          get today's outdoor missions");
                println!("  pick <n>          accept a mission");
                println!("  done              I did it!");
                println!("  abandon           pick another mission");
            }
            View::Garden => println!("  Nothing to do here but admire your tree."),
        }
    }

    // Dashboard

    fn print_dashboard(&self) {
        self.print_status();
        let d = self.app.dashboard();
        if d.is_generated() {
            self.print_tasks();
            return;
        }
        println!("How are you feeling today?");
        for (i, mood) in Mood::ALL.iter().enumerate() {
            println!("  {}. {} {}", i + 1, mood.emoji(), mood.label());
        }
        println!("Energy: {}/10", d.energy());
        if !d.tasks().is_empty() {
            self.print_tasks();
        }
    }

    fn print_tasks(&self) {
        for (i, task) in self.app.tasks().iter().enumerate() {
            let mark = if task.completed { "✔" } else { " " };
            println!("  [{}] {}. {}  (+{} XP)", mark, i + 1, task.text, task.xp_value);
        }
    }

    fn dashboard_verb(&mut self, input: &str) {
        let (verb, arg) = input.split_once(' ').unwrap_or((input, ""));
        match verb {
            "mood" => match Mood::parse(arg.trim()) {
                Some(mood) => {
                    self.app.select_mood(mood);
                    println!("{} {}", mood.emoji(), mood.label());
                }
                None => print_error("Usage: mood <great|okay|tired|anxious|down|1-5>"),
            },
            "energy" => match arg.trim().parse::<u8>() {
                Ok(level) => println!("Energy: {}/10", self.app.set_energy(level)),
                Err(_) => print_error("Usage: energy <1-10>"),
            },
            "go" => {
                let result = self.app.generate_routine();
                self.started(result);
            }
            "done" => match index_arg(arg) {
                Some(index) => match self.app.complete_task(index) {
                    Ok(Some(award)) => {
                        print_success(&award_line(&award));
                        self.started(Ok(()));
                    }
                    Ok(None) => print_dim("Already done."),
                    Err(e) => print_error(&e.to_string()),
                },
                None => print_error("Usage: done <n>"),
            },
            "new" => {
                self.app.new_routine();
                self.print_dashboard();
            }
            "tasks" => self.print_tasks(),
            _ => print_error("Unknown action here (try /help)"),
        }
    }

    // Study

    fn print_study(&self) {
        let study = self.app.study();
        println!("⏱  {}{}", study.timer.display(), if study.timer.is_running() { "  (running)" } else { "" });
        match study.planner.plan() {
            Some(plan) => {
                println!("{}", plan.intro_message);
                for (i, step) in plan.steps.iter().enumerate() {
                    let mark = if study.planner.is_step_done(i) { "✔" } else { " " };
                    println!("  [{}] {}. {}", mark, i + 1, step);
                }
            }
            None => print_dim("What do you want to study? (goal <text>)"),
        }
    }

    fn study_verb(&mut self, input: &str) {
        let (verb, arg) = input.split_once(' ').unwrap_or((input, ""));
        match verb {
            "start" | "pause" => match self.app.toggle_timer() {
                Ok(true) => print_info(&format!("Focus! {}", self.app.study().timer.display())),
                Ok(false) => print_dim(&format!("Paused at {}", self.app.study().timer.display())),
                Err(e) => print_error(&e.to_string()),
            },
            "reset" => {
                self.app.reset_timer();
                println!("⏱  {}", self.app.study().timer.display());
            }
            "timer" => println!("⏱  {}", self.app.study().timer.display()),
            "goal" => {
                let result = self.app.create_plan(arg);
                self.started(result);
            }
            "step" => match index_arg(arg) {
                Some(index) => match self.app.toggle_step(index) {
                    Ok(StepToggle::Completed(award)) => {
                        print_success(&award_line(&award));
                        let planner = &self.app.study().planner;
                        if planner.all_complete() {
                            print_success(&format!("Mission complete! +{} XP", planner.completion_xp()));
                        }
                    }
                    Ok(StepToggle::Reopened) => print_dim("Step reopened."),
                    Err(e) => print_error(&e.to_string()),
                },
                None => print_error("Usage: step <n>"),
            },
            "plan" => self.print_study(),
            "clear" => {
                self.app.clear_plan();
                self.print_study();
            }
            _ => print_error("Unknown action here (try /help)"),
        }
    }

    // Social

    fn print_social(&self) {
        let social = self.app.social();
        if social.scenario().is_none() {
            println!("Pick a scenario to practice:");
            for (i, scenario) in SCENARIOS.iter().enumerate() {
                println!("  {}. {}", i + 1, scenario);
            }
            return;
        }
        for message in social.transcript() {
            match message.sender {
                Sender::User => println!("🙂 {}", message.text),
                Sender::Ai => println!("💬 {}", message.text),
            }
        }
    }

    fn social_verb(&mut self, input: &str) {
        match social_input(input, self.app.social().scenario().is_some()) {
            SocialInput::Say(text) => {
                let result = self.app.send_message(text);
                self.started(result);
            }
            SocialInput::Play(Some(index)) => match self.app.start_scenario(index) {
                Ok(_) => self.print_social(),
                Err(e) => print_error(&e.to_string()),
            },
            SocialInput::Play(None) => print_error("Usage: play <n>"),
        }
    }

    // Quest

    fn print_quest(&self) {
        println!("Outdoor level {}", self.app.progress().outdoor_level);
        match self.app.quest().state() {
            QuestState::NoMissions => print_dim("Ready for a small adventure? (missions)"),
            QuestState::Offered(missions) => {
                for (i, mission) in missions.iter().enumerate() {
                    println!("  {}. {}", i + 1, mission);
                }
            }
            QuestState::Active(mission) => println!("🎯 {}", mission),
        }
    }

    fn quest_verb(&mut self, input: &str) {
        let (verb, arg) = input.split_once(' ').unwrap_or((input, ""));
        match verb {
            "missions" => {
                let result = self.app.request_missions();
                self.started(result);
            }
            "pick" => match index_arg(arg).map(|i| self.app.select_mission(i)) {
                Some(Ok(mission)) => println!("🎯 {}", mission),
                Some(Err(e)) => print_error(&e.to_string()),
                None => print_error("Usage: pick <n>"),
            },
            "done" => match self.app.complete_mission() {
                Ok((_, award)) => {
                    print_success(&format!("Amazing! You braved the outside. 🌟 (+{} XP)", award.amount));
                    if award.leveled_up {
                        print_success(&award_line(&award));
                    }
                }
                Err(e) => print_error(&e.to_string()),
            },
            "abandon" => match self.app.abandon_mission() {
                Ok(()) => self.print_quest(),
                Err(e) => print_error(&e.to_string()),
            },
            _ => print_error("Unknown action here (try /help)"),
        }
    }

    // Garden

    fn print_garden(&self) {
        let p = self.app.progress();
        println!("{}", p.garden().render());
        println!("Level {}  ·  {:.0}% to next level", p.level, p.progress_percent());
        self.print_status();
        println!();
        println!("{}", render_weekly_activity());
    }

    // Rescue

    fn print_rescue(&self) {
        let rescue = self.app.rescue();
        if !rescue.is_open() {
            return;
        }
        print_header("Rescue");
        match rescue.mode() {
            RescueMode::Menu => {
                println!("  breathe   a slow breathing exercise");
                println!("  journal   write it down and let it go");
                println!("  message   ask someone for support");
                println!("  tip       a quick grounding tip");
                println!("  close     back to where you were");
            }
            RescueMode::Breathing(phase) => println!("🫧 {}  (back to stop)", phase.prompt()),
            RescueMode::Journal(_) => print_dim("Write whatever you feel. 'save' when you're done."),
            RescueMode::Message(_) => print_dim("Who is it for? (to <name>, about <context>, draft)"),
        }
    }

    fn rescue_verb(&mut self, input: &str) {
        let (verb, arg) = input.split_once(' ').unwrap_or((input, ""));
        let mode = self.app.rescue().mode().clone();
        let in_menu = mode == RescueMode::Menu;
        let result = match (verb, &mode) {
            ("close", _) => {
                self.app.close_rescue();
                print_dim("Take care. 🌱");
                return;
            }
            ("back", _) if !in_menu => {
                self.app.rescue_back();
                self.print_rescue();
                return;
            }
            ("breathe", RescueMode::Menu) => {
                self.app.breathe();
                self.print_rescue();
                return;
            }
            ("journal", RescueMode::Menu) => {
                self.app.journal();
                self.print_rescue();
                return;
            }
            ("message", RescueMode::Menu) => {
                self.app.message();
                self.print_rescue();
                return;
            }
            ("tip", RescueMode::Menu) => {
                let result = self.app.request_tip();
                self.started(result);
                return;
            }
            ("save", RescueMode::Journal(_)) => self
                .app
                .save_journal()
                .map(|_| print_success("Your feelings have been released. 🍃")),
            (_, RescueMode::Journal(_)) => self.app.write_journal(input),
            ("to", RescueMode::Message(_)) => self.app.set_recipient(arg),
            ("about", RescueMode::Message(_)) => self.app.set_context(arg),
            ("draft", RescueMode::Message(_)) => {
                let result = self.app.draft_message();
                self.started(result);
                return;
            }
            ("regenerate", RescueMode::Message(_)) => self.app.regenerate_draft(),
            ("copy", RescueMode::Message(_)) => self.app.copy_draft().map(|draft| println!("{}", draft)),
            _ => {
                print_error("Not available here (try /help)");
                return;
            }
        };
        if let Err(e) = result {
            print_error(&e.to_string());
        }
    }
}

/// Run the interactive session until /quit or end of input
pub async fn run(config: Config) -> Result<()> {
    let coach = Coach::from_config(&config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let app = App::new(coach, config.study.focus_seconds(), tx.clone());
    let mut repl = Repl { app, pending: 0, spinner: None };

    print_banner();
    repl.print_view();
    spawn_input_thread(tx);

    while let Some(event) = rx.recv().await {
        match event {
            AppEvent::Input(line) => {
                if let Flow::Quit = repl.handle_line(&line) {
                    break;
                }
            }
            AppEvent::InputClosed => break,
            event => {
                if matches!(event, AppEvent::Generated(_)) {
                    repl.received();
                }
                for notice in repl.app.handle_event(event) {
                    repl.show_notice(&notice);
                }
            }
        }
    }

    if let Some(spinner) = repl.spinner.take() {
        spinner.finish_and_clear();
    }
    print_success("See you tomorrow! 🌱");
    Ok(())
}
