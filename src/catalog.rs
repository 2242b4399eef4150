/// One academic period: its table, display label, and the fixed subject
/// columns that may appear in a row. Tables are additive across cohorts,
/// so any suffix of this catalog may be absent from a given store.
#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub table: &'static str,
    pub label: &'static str,
    pub subjects: &'static [&'static str],
}

pub const SEMESTERS: &[Period] = &[
    Period {
        table: "sem1",
        label: "Semester 1",
        subjects: &[
            "systems_mechanical_engineering",
            "basic_electrical_engineering",
            "engineering_mathematics_1",
            "engineering_chemistry",
            "programming_problem_solving",
        ],
    },
    Period {
        table: "sem2",
        label: "Semester 2",
        subjects: &[
            "engineering_mechanics",
            "engineering_graphics",
            "basic_electronics_engineering",
            "engineering_physics",
            "engineering_mathematics_2",
        ],
    },
    Period {
        table: "sem3",
        label: "Semester 3",
        subjects: &[
            "discrete_mathematics",
            "data_structures",
            "object_oriented_programming",
            "computer_graphics",
            "operating_systems",
        ],
    },
    Period {
        table: "sem4",
        label: "Semester 4",
        subjects: &[
            "data_structures_algorithms",
            "software_engineering",
            "statistics",
            "internet_of_things",
            "management_information_system",
        ],
    },
    Period {
        table: "sem5",
        label: "Semester 5",
        subjects: &[
            "artificial_intelligence",
            "database_management_systems",
            "web_technology",
            "pattern_recognition",
            "computer_networks",
        ],
    },
    Period {
        table: "sem6",
        label: "Semester 6",
        subjects: &[
            "cyber_security",
            "data_science",
            "artificial_neural_networks",
            "cloud_computing",
        ],
    },
];
