use std::{fs, path::Path};

use anyhow::Context;
use clap::Parser;
use shared::{configure_tracing, load_dotenv, model::Routine};
use tracing::{debug, info};
use tracker::{
    db::{
        backend::{FileBackend, SqliteBackend, StorageBackend},
        Store,
    },
    seed, Repository, SessionLabel,
};

mod cli;
use cli::{routine_patch, BackendKind, Cli, Command};

const SQLITE_FILE_NAME: &str = "routines.sqlite";

fn open_backend(kind: BackendKind, data_dir: &Path) -> anyhow::Result<Box<dyn StorageBackend>> {
    Ok(match kind {
        BackendKind::File => Box::new(FileBackend::open(data_dir)?),
        BackendKind::Sqlite => {
            fs::create_dir_all(data_dir)
                .with_context(|| format!("Creating data dir {}", data_dir.display()))?;
            Box::new(SqliteBackend::open(data_dir.join(SQLITE_FILE_NAME))?)
        }
    })
}

fn open_repository(args: &Cli) -> anyhow::Result<Repository<Box<dyn StorageBackend>>> {
    let backend = open_backend(args.backend, &args.data_dir)?;
    let mut repository = Repository::new(Store::new(backend));
    repository.load();
    Ok(repository)
}

fn print_summary(routine: &Routine) {
    println!(
        "{}  {}  ({} exercises, updated {})",
        routine.id,
        routine.name,
        routine.exercises.len(),
        routine.updated_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_routine(routine: &Routine) {
    println!("{} [{}]", routine.name, routine.id);
    if let Some(description) = &routine.description {
        println!("  {description}");
    }
    println!(
        "  created {}, updated {}",
        routine.created_at.to_rfc3339(),
        routine.updated_at.to_rfc3339()
    );
    for exercise in &routine.exercises {
        let weight = exercise
            .weight
            .map(|w| format!(" @ {w}kg"))
            .unwrap_or_default();
        println!(
            "  - {} {}x{}{}  [{}]",
            exercise.name, exercise.sets, exercise.reps, weight, exercise.id
        );
        if let Some(notes) = &exercise.notes {
            println!("      {notes}");
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    load_dotenv()?;
    configure_tracing();

    let args = Cli::parse();
    debug!(?args);

    match args.command.clone() {
        Command::Login { name } => {
            let mut session = SessionLabel::new(open_backend(args.backend, &args.data_dir)?);
            let name = session.login(&name)?;
            println!("Hello, {name}");

            if let Some(templates) = seed::templates_for_label(&name) {
                let mut repository = open_repository(&args)?;
                let created = repository.seed_if_absent(&templates)?;
                info!("Seeded {} routines for {name}", created.len());
                created.iter().for_each(print_summary);
            }
        }
        Command::Logout => {
            SessionLabel::new(open_backend(args.backend, &args.data_dir)?).logout()?;
        }
        Command::Whoami => {
            match SessionLabel::new(open_backend(args.backend, &args.data_dir)?).current()? {
                Some(name) => println!("{name}"),
                None => println!("Not logged in"),
            }
        }
        Command::List => {
            let repository = open_repository(&args)?;
            let routines = repository.routines()?;
            if routines.is_empty() {
                println!("No routines yet");
            }
            routines.iter().for_each(print_summary);
        }
        Command::Show { id } => {
            let repository = open_repository(&args)?;
            let routine = repository
                .find_by_id(&id)?
                .with_context(|| format!("Routine {id} doesn't exist"))?;
            print_routine(routine);
        }
        Command::Create { name, description } => {
            let routine = open_repository(&args)?.create(&name, description)?;
            print_summary(&routine);
        }
        Command::Update {
            id,
            name,
            description,
            clear_description,
        } => {
            let patch = routine_patch(name, description, clear_description);
            let routine = open_repository(&args)?.update(&id, patch)?;
            print_summary(&routine);
        }
        Command::Delete { id } => {
            open_repository(&args)?.delete(&id)?;
        }
        Command::AddExercise {
            routine_id,
            exercise,
        } => {
            let exercise = open_repository(&args)?.add_exercise(&routine_id, exercise.into())?;
            println!("{}", exercise.id);
        }
        Command::UpdateExercise {
            routine_id,
            exercise_id,
            changes,
        } => {
            let mut repository = open_repository(&args)?;
            repository.update_exercise(&routine_id, &exercise_id, changes.into())?;
            if let Some(routine) = repository.find_by_id(&routine_id)? {
                print_routine(routine);
            }
        }
        Command::DeleteExercise {
            routine_id,
            exercise_id,
        } => {
            open_repository(&args)?.delete_exercise(&routine_id, &exercise_id)?;
        }
        Command::Export => {
            let store = Store::new(open_backend(args.backend, &args.data_dir)?);
            match store.raw()? {
                Some(data) => println!("{data}"),
                None => println!("{}", serde_json::to_string(&Vec::<Routine>::new())?),
            }
        }
    }

    Ok(())
}
