use serde::{Deserialize, Serialize};

/// Subject area a course, professor, or quiz belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Cs,
    Math,
    Art,
    History,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Cs => "cs",
            Department::Math => "math",
            Department::Art => "art",
            Department::History => "history",
        }
    }

    /// Infers the department from a room identifier by substring match
    /// (`cs` / `math` / `art` / `hist`). `None` means the generic department.
    pub fn from_room_id(room_id: &str) -> Option<Department> {
        if room_id.contains("cs") {
            Some(Department::Cs)
        } else if room_id.contains("math") {
            Some(Department::Math)
        } else if room_id.contains("art") {
            Some(Department::Art)
        } else if room_id.contains("hist") {
            Some(Department::History)
        } else {
            None
        }
    }
}

/// A course offering: identity, department, and the syllabus topics a player
/// progresses through as they level up.
#[derive(Debug, Clone, Copy)]
pub struct Course {
    pub id: &'static str,
    pub name: &'static str,
    pub department: Department,
    pub description: &'static str,
    pub syllabus: &'static [&'static str],
}

pub const COURSE_CATALOG: &[Course] = &[
    Course {
        id: "cs_web",
        name: "Web Development 101",
        department: Department::Cs,
        description: "HTML, CSS, JS basics",
        syllabus: &[
            "HTML Structure & Semantics",
            "CSS Box Model & Flexbox",
            "JavaScript Syntax Basics",
            "DOM Manipulation",
            "Event Handling",
            "Fetch API & JSON",
            "React Components",
        ],
    },
    Course {
        id: "cs_dsa",
        name: "Data Structures & Algo",
        department: Department::Cs,
        description: "Trees, Graphs, O-Notation",
        syllabus: &[
            "Big O Notation",
            "Arrays & Strings",
            "Linked Lists",
            "Stacks & Queues",
            "Recursion",
            "Sorting Algorithms",
            "Binary Trees",
        ],
    },
    Course {
        id: "cs_os",
        name: "Operating Systems",
        department: Department::Cs,
        description: "Processes, Threads, Memory",
        syllabus: &[
            "Process Management",
            "Threads & Concurrency",
            "CPU Scheduling",
            "Deadlocks",
            "Memory Management",
            "Virtual Memory",
            "File Systems",
        ],
    },
    Course {
        id: "cs_ai",
        name: "Intro to AI",
        department: Department::Cs,
        description: "Basics of ML and Neural Nets",
        syllabus: &[
            "Search Algorithms",
            "Knowledge Representation",
            "Probability & Uncertainty",
            "Machine Learning Basics",
            "Neural Networks",
            "Computer Vision",
            "Natural Language Processing",
        ],
    },
    Course {
        id: "math_calc1",
        name: "Calculus I",
        department: Department::Math,
        description: "Limits and Derivatives",
        syllabus: &[
            "Functions & Limits",
            "Continuity",
            "Derivatives Definition",
            "Rules of Differentiation",
            "Chain Rule",
            "Implicit Differentiation",
            "Applications of Derivatives",
        ],
    },
    Course {
        id: "math_stats",
        name: "Statistics",
        department: Department::Math,
        description: "Probability and Distributions",
        syllabus: &[
            "Data Types & Visualization",
            "Measures of Central Tendency",
            "Probability Basics",
            "Random Variables",
            "Normal Distribution",
            "Hypothesis Testing",
            "Regression",
        ],
    },
    Course {
        id: "math_la",
        name: "Linear Algebra",
        department: Department::Math,
        description: "Vectors and Matrices",
        syllabus: &[
            "Systems of Linear Equations",
            "Matrix Operations",
            "Determinants",
            "Vector Spaces",
            "Eigenvalues & Eigenvectors",
            "Linear Transformations",
            "Orthogonality",
        ],
    },
    Course {
        id: "art_hist",
        name: "Art History",
        department: Department::Art,
        description: "Renaissance to Modern",
        syllabus: &[
            "Prehistoric Art",
            "Classical Greek & Roman",
            "The Renaissance",
            "Baroque & Rococo",
            "Impressionism",
            "Cubism & Surrealism",
            "Contemporary Art",
        ],
    },
    Course {
        id: "art_color",
        name: "Color Theory",
        department: Department::Art,
        description: "Mixing and Palettes",
        syllabus: &[
            "The Color Wheel",
            "Hue, Saturation, Value",
            "Warm vs Cool Colors",
            "Complementary Colors",
            "Color Psychology",
            "Pigments & Mixing",
            "Digital Color",
        ],
    },
    Course {
        id: "art_sketch",
        name: "Sketching Basics",
        department: Department::Art,
        description: "Perspectives and Shading",
        syllabus: &[
            "Line & Contour",
            "Shape & Form",
            "Value & Shading",
            "One-Point Perspective",
            "Two-Point Perspective",
            "Human Proportions",
            "Gesture Drawing",
        ],
    },
    Course {
        id: "hist_world",
        name: "World History",
        department: Department::History,
        description: "Ancient Civilizations",
        syllabus: &[
            "The Fertile Crescent",
            "Ancient Egypt",
            "Indus Valley Civilization",
            "Ancient China",
            "The Silk Road",
            "The Age of Discovery",
            "Industrial Revolution",
        ],
    },
    Course {
        id: "hist_eu",
        name: "European History",
        department: Department::History,
        description: "Middle Ages to Cold War",
        syllabus: &[
            "The Fall of Rome",
            "Feudalism & Middle Ages",
            "The Renaissance",
            "The Reformation",
            "The Enlightenment",
            "French Revolution",
            "The World Wars",
        ],
    },
    Course {
        id: "hist_civ",
        name: "Civics",
        department: Department::History,
        description: "Government and Politics",
        syllabus: &[
            "Foundations of Government",
            "The Constitution",
            "Legislative Branch",
            "Executive Branch",
            "Judicial Branch",
            "Civil Rights & Liberties",
            "International Relations",
        ],
    },
];

pub fn course_by_id(id: &str) -> Option<&'static Course> {
    COURSE_CATALOG.iter().find(|c| c.id == id)
}

pub fn courses_in(department: Department) -> impl Iterator<Item = &'static Course> {
    COURSE_CATALOG
        .iter()
        .filter(move |c| c.department == department)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_inference_from_room_ids() {
        assert_eq!(Department::from_room_id("course_cs"), Some(Department::Cs));
        assert_eq!(
            Department::from_room_id("course_math"),
            Some(Department::Math)
        );
        assert_eq!(Department::from_room_id("course_art"), Some(Department::Art));
        assert_eq!(
            Department::from_room_id("course_history"),
            Some(Department::History)
        );
        assert_eq!(Department::from_room_id("quad"), None);
        assert_eq!(Department::from_room_id("dorm_abc123"), None);
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in COURSE_CATALOG.iter().enumerate() {
            for b in &COURSE_CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn every_course_has_a_syllabus() {
        assert!(COURSE_CATALOG.iter().all(|c| !c.syllabus.is_empty()));
    }
}
