use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::{
    model::{ExercisePatch, NewExercise, RoutinePatch},
    types::Uuid,
};

#[derive(Debug, Clone, Parser)]
#[clap(name = "routines", about = "Keeps track of workout routines on this device")]
pub struct Cli {
    #[clap(long, env = "ROUTINES_DATA_DIR", default_value = ".routines")]
    pub data_dir: PathBuf,
    #[clap(long, env = "ROUTINES_BACKEND", value_enum, default_value = "file")]
    pub backend: BackendKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// One json file per slot in the data dir
    File,
    /// A sqlite database in the data dir
    Sqlite,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sets the display name, seeding the built-in routines if it's recognized
    Login { name: String },
    Logout,
    Whoami,
    List,
    Show { id: Uuid },
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
    },
    Delete { id: Uuid },
    AddExercise {
        routine_id: Uuid,
        #[command(flatten)]
        exercise: ExerciseArgs,
    },
    UpdateExercise {
        routine_id: Uuid,
        exercise_id: Uuid,
        #[command(flatten)]
        changes: ExerciseChangeArgs,
    },
    DeleteExercise { routine_id: Uuid, exercise_id: Uuid },
    /// Prints the stored routines json
    Export,
}

#[derive(Debug, Clone, Args)]
pub struct ExerciseArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub sets: u32,
    #[arg(long)]
    pub reps: u32,
    #[arg(long)]
    pub weight: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<ExerciseArgs> for NewExercise {
    fn from(args: ExerciseArgs) -> Self {
        let ExerciseArgs {
            name,
            sets,
            reps,
            weight,
            notes,
        } = args;
        NewExercise {
            name,
            sets,
            reps,
            weight,
            notes,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExerciseChangeArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub sets: Option<u32>,
    #[arg(long)]
    pub reps: Option<u32>,
    #[arg(long, conflicts_with = "clear_weight")]
    pub weight: Option<f64>,
    #[arg(long)]
    pub clear_weight: bool,
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    #[arg(long)]
    pub clear_notes: bool,
}

impl From<ExerciseChangeArgs> for ExercisePatch {
    fn from(args: ExerciseChangeArgs) -> Self {
        ExercisePatch {
            name: args.name,
            sets: args.sets,
            reps: args.reps,
            weight: flag_or_value(args.clear_weight, args.weight),
            notes: flag_or_value(args.clear_notes, args.notes),
        }
    }
}

pub fn routine_patch(
    name: Option<String>,
    description: Option<String>,
    clear_description: bool,
) -> RoutinePatch {
    RoutinePatch {
        name,
        description: flag_or_value(clear_description, description),
    }
}

/// `--clear-x` wins over leaving the field alone, a value sets it
fn flag_or_value<T>(clear: bool, value: Option<T>) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_exercise() {
        let cli = Cli::try_parse_from([
            "routines",
            "--backend",
            "sqlite",
            "update-exercise",
            "01234567-89ab-cdef-0123-456789abcdef",
            "01234567-89ab-cdef-0123-456789abcdee",
            "--weight",
            "40",
            "--clear-notes",
        ])
        .unwrap();
        assert_eq!(cli.backend, BackendKind::Sqlite);

        let Command::UpdateExercise { changes, .. } = cli.command else {
            panic!("wrong subcommand");
        };
        let patch = ExercisePatch::from(changes);
        assert_eq!(patch, ExercisePatch::default().weight(40.0).clear_notes());
    }

    #[test]
    fn test_clear_and_set_conflict() {
        assert!(Cli::try_parse_from([
            "routines",
            "update",
            "01234567-89ab-cdef-0123-456789abcdef",
            "--description",
            "x",
            "--clear-description",
        ])
        .is_err());
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert!(Cli::try_parse_from(["routines", "show", "not-an-id"]).is_err());
    }
}
