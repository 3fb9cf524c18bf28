use clap::Parser;
use pushdown::{
    analyze, parse_list, parse_transitions, Automaton, Engine, PdaError, ProgramLoader,
    ProgramManager, Step, Verdict, DEFAULT_BRANCH_CAP, MAX_EXECUTION_STEPS,
};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

/// A nondeterministic pushdown automaton simulator.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  pushdown-cli --example 'a^n b^n' --input aabb
  pushdown-cli --program automata/palindrome.pda --input abba --debug
  cat automata/abc.pda | pushdown-cli --input abc
  pushdown-cli --initial q0 --finals qf --input-alphabet a,b --stack-alphabet Z0 \\
      --stack-init Z0 --rules 'q0, a, Z0 -> q0, Z0; q0, b, Z0 -> qf, Z0' --input ab")]
struct Cli {
    /// Path to an automaton definition file (.pda).
    /// A definition can also be piped via stdin.
    #[clap(short, long)]
    program: Option<String>,

    /// Name or index of a built-in automaton.
    #[clap(short, long, conflicts_with = "program")]
    example: Option<String>,

    /// List the built-in automata and exit.
    #[clap(short, long)]
    list: bool,

    /// The input string to simulate.
    #[clap(short, long, default_value = "")]
    input: String,

    /// Comma separated states (field mode).
    #[clap(long)]
    states: Option<String>,

    /// Comma separated input alphabet (field mode).
    #[clap(long)]
    input_alphabet: Option<String>,

    /// Comma separated stack alphabet (field mode).
    #[clap(long)]
    stack_alphabet: Option<String>,

    /// Initial state. Enables field mode.
    #[clap(long, conflicts_with_all = ["program", "example"])]
    initial: Option<String>,

    /// Comma separated final states (field mode).
    #[clap(long)]
    finals: Option<String>,

    /// Initial stack symbol (field mode).
    #[clap(long)]
    stack_init: Option<String>,

    /// Transition rules separated by newlines or ';' (field mode).
    #[clap(long)]
    rules: Option<String>,

    /// Maximum number of branches kept after each step.
    #[clap(long, default_value_t = DEFAULT_BRANCH_CAP)]
    branch_cap: usize,

    /// Give up after this many steps.
    #[clap(long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the active branches after every step.
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print status snapshots as JSON.
    #[clap(long)]
    json: bool,

    /// Print analyzer diagnostics before simulating.
    #[clap(long)]
    check: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return ExitCode::SUCCESS;
    }

    let automaton = match load_automaton(&cli) {
        Ok(automaton) => automaton,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    if cli.check {
        for diagnostic in analyze(&automaton) {
            println!("warning: {diagnostic}");
        }
    }

    let mut engine = Engine::new(automaton).with_branch_cap(cli.branch_cap);

    if let Err(e) = engine.reset(&cli.input) {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    let result = if cli.debug {
        print_status(&engine, cli.json);
        let mut result = Step::Running;
        for _ in 0..cli.max_steps {
            result = engine.step();
            print_status(&engine, cli.json);
            if result.is_halt() {
                break;
            }
        }
        result
    } else {
        engine.run(cli.max_steps)
    };

    match result {
        Step::Halt(Verdict::Accepted) => {
            println!("accepted after {} steps", engine.step_count());
            ExitCode::SUCCESS
        }
        Step::Halt(Verdict::Rejected) => {
            println!("rejected after {} steps", engine.step_count());
            ExitCode::from(1)
        }
        Step::Running => {
            println!("undecided after {} steps", engine.step_count());
            ExitCode::from(3)
        }
    }
}

/// Picks the automaton from the first source given: a definition file, a built-in
/// example, individual fields, or a definition piped on stdin.
fn load_automaton(cli: &Cli) -> Result<Automaton, PdaError> {
    if let Some(path) = &cli.program {
        ProgramLoader::load_program(Path::new(path))
    } else if let Some(example) = &cli.example {
        match example.parse::<usize>() {
            Ok(index) => ProgramManager::get_program_by_index(index),
            Err(_) => ProgramManager::get_program_by_name(example),
        }
    } else if let Some(initial) = &cli.initial {
        Ok(automaton_from_fields(cli, initial))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| PdaError::FileError(format!("Failed to read from stdin: {}", e)))?;
        ProgramLoader::load_program_from_string(&buffer)
    } else {
        Err(PdaError::ValidationError(
            "No automaton given. Use --program, --example, --initial or pipe a definition"
                .to_string(),
        ))
    }
}

fn automaton_from_fields(cli: &Cli, initial: &str) -> Automaton {
    let list = |field: &Option<String>| field.as_deref().map(parse_list).unwrap_or_default();
    let rules = cli.rules.as_deref().unwrap_or_default().replace(';', "\n");

    Automaton::new(
        list(&cli.states),
        list(&cli.input_alphabet),
        list(&cli.stack_alphabet),
        initial.trim(),
        list(&cli.finals),
        parse_transitions(&rules),
        cli.stack_init.as_deref().map(|s| s.trim().to_string()),
    )
}

fn print_status(engine: &Engine, json: bool) {
    let status = engine.status();

    if json {
        match serde_json::to_string(&status) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("Failed to serialize status: {e}"),
        }
        return;
    }

    let verdict = match status.verdict {
        Some(Verdict::Accepted) => "accepted",
        Some(Verdict::Rejected) => "rejected",
        None => "running",
    };
    println!(
        "Step: {}, Status: {}, Branches: {}",
        status.step_count, verdict, status.total_branches
    );
    println!("{status}\n");
}
