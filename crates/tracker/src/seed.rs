//! Built-in routines loaded once for a recognized session label

use shared::model::{NewExercise, RoutineTemplate};

/// Session label (case-insensitive, trimmed) that gets the built-in routines
pub const SEED_LABEL: &str = "dario";

pub fn templates_for_label(label: &str) -> Option<Vec<RoutineTemplate>> {
    if label.trim().eq_ignore_ascii_case(SEED_LABEL) {
        Some(builtin_templates())
    } else {
        None
    }
}

fn walk() -> NewExercise {
    NewExercise::new("Caminar", 1, 30).with_notes("Salir a caminar")
}

pub fn builtin_templates() -> Vec<RoutineTemplate> {
    vec![
        RoutineTemplate::new(
            "Día 1 - Piernas",
            vec![
                NewExercise::new("Sentadillas", 3, 8)
                    .with_notes("Sentarte y pararte de una silla. Sin peso."),
                NewExercise::new("Subida de escalon", 3, 8).with_notes(
                    "Poner dos discos de 20kg en el suelo uno encima de otro. \
                     Subir y bajar 8 veces con cada pierna. Sin peso.",
                ),
                walk(),
            ],
        ),
        RoutineTemplate::new(
            "Día 2 - Pecho",
            vec![
                NewExercise::new("Press de banca", 3, 8)
                    .with_weight(2.0)
                    .with_notes(
                        "Acostado en el banco, con las mancuernas de 2kg, \
                         subir y bajar los brazos.",
                    ),
                NewExercise::new("Remo", 3, 8).with_weight(2.0).with_notes(
                    "Con el respaldar del banco un poco inclinado, apoyarse en el \
                     respaldar con una mano y con la otra hacer remo.",
                ),
                walk(),
            ],
        ),
        RoutineTemplate::new(
            "Día 3 - Tren superior",
            vec![
                NewExercise::new("Biceps", 3, 9)
                    .with_weight(6.0)
                    .with_notes("Biceps 8 repeticiones con cada brazo con mancuernas de 6kg."),
                NewExercise::new("Press hombro", 3, 8)
                    .with_weight(2.0)
                    .with_notes(
                        "De pie, espalda recta, subir los brazos desde los hombres hasta \
                         arriba con las mancuernas de 2kg.",
                    ),
                walk(),
            ],
        ),
    ]
}
