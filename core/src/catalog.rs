//! Room catalog: static room definitions, the private-dorm synthesis rule,
//! and the single lookup the rest of the game uses.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use crate::constants::{
    DORM_PREFIX, DORM_WARP_TARGET, ROOM_CAFE, ROOM_COURSE_ART, ROOM_COURSE_CS, ROOM_COURSE_HISTORY,
    ROOM_COURSE_MATH, ROOM_ENTRANCE, ROOM_LIBRARY, ROOM_QUAD, ROOM_TRACK, TILE_SIZE,
};
use crate::types::{
    Department, Direction, Npc, NpcRole, ObjectKind, PlacedObject, Position, PropKind, Rect,
    RoomClass, RoomDefinition, Surface, Warp,
};

/// Tiles-to-pixels shorthand used throughout the room data.
const fn g(n: i32) -> i32 {
    n * TILE_SIZE
}

fn object(x: i32, y: i32, w: i32, h: i32, kind: ObjectKind) -> PlacedObject {
    PlacedObject::new(Rect::new(x, y, w, h), kind)
}

fn colored(x: i32, y: i32, w: i32, h: i32, kind: ObjectKind, color: &'static str) -> PlacedObject {
    PlacedObject::colored(Rect::new(x, y, w, h), kind, color)
}

fn labeled(x: i32, y: i32, w: i32, h: i32, kind: ObjectKind, label: &'static str) -> PlacedObject {
    PlacedObject::labeled(Rect::new(x, y, w, h), kind, label)
}

fn building(x: i32, y: i32, w: i32, h: i32, label: &'static str, color: &'static str) -> PlacedObject {
    PlacedObject {
        rect: Rect::new(x, y, w, h),
        kind: ObjectKind::Building,
        color: Some(color),
        label: Some(label),
    }
}

fn flower(x: i32, y: i32, color: &'static str) -> PlacedObject {
    colored(x, y, g(1), g(1), ObjectKind::Flower, color)
}

fn warp(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    target_room: &'static str,
    tx: i32,
    ty: i32,
    facing: Direction,
    label: Option<&'static str>,
) -> Warp {
    Warp {
        rect: Rect::new(x, y, w, h),
        target_room,
        target_position: Position::new(tx, ty),
        target_facing: facing,
        label,
    }
}

// ---- Static room data ---- //

fn entrance() -> RoomDefinition {
    RoomDefinition {
        id: ROOM_ENTRANCE.to_string(),
        name: "Campus Gates".to_string(),
        width: g(20),
        height: g(20),
        spawn: Position::new(g(10), g(10)),
        class: RoomClass::Public,
        base_tile: Surface::Grass,
        objects: vec![
            // Main path and the wall closing the bottom edge.
            object(g(8), 0, g(4), g(20), ObjectKind::Floor(Surface::Stone)),
            object(g(6), g(19), g(8), g(1), ObjectKind::Wall),
            // University gate archway with its collision pillars.
            labeled(g(3), g(5), g(14), g(4), ObjectKind::Gate, "Welcome to Birdie University"),
            object(g(3), g(5), g(2), g(2), ObjectKind::Wall),
            object(g(15), g(5), g(2), g(2), ObjectKind::Wall),
            flower(g(6), g(10), "#ef4444"),
            flower(g(13), g(10), "#ef4444"),
            flower(g(6), g(12), "#3b82f6"),
            flower(g(13), g(12), "#3b82f6"),
            flower(g(6), g(14), "#f59e0b"),
            flower(g(13), g(14), "#f59e0b"),
            object(g(5), g(8), g(1), g(1), ObjectKind::Bush),
            object(g(14), g(8), g(1), g(1), ObjectKind::Bush),
            object(g(5), g(16), g(1), g(1), ObjectKind::Bush),
            object(g(14), g(16), g(1), g(1), ObjectKind::Bush),
            flower(g(2), g(18), "#fff"),
            flower(g(18), g(2), "#fff"),
        ],
        npcs: vec![],
        warps: vec![warp(
            g(8),
            0,
            g(4),
            g(1),
            ROOM_QUAD,
            g(16),
            g(29),
            Direction::Up,
            Some("Enter Campus"),
        )],
    }
}

const QUAD_PROF_DIALOGUES: &[&str] = &[
    "Remember to cite your sources!",
    "The library is a quiet place for study.",
    "I'm late for my lecture on Fish History.",
];
const QUAD_FRED_DIALOGUES: &[&str] = &[
    "I can't find the Math Hall...",
    "Is there a party tonight?",
    "This campus is huge!",
];
const QUAD_SARAH_DIALOGUES: &[&str] = &[
    "I'm so stressed about finals.",
    "Have you been to the cafe? The latte is great.",
    "I practically live in the CS Lab.",
];

fn quad() -> RoomDefinition {
    let mut objects = vec![
        // Paving.
        object(0, g(15), g(32), g(2), ObjectKind::Floor(Surface::Stone)),
        object(g(15), g(7), g(2), g(7), ObjectKind::Floor(Surface::Stone)),
        object(g(15), g(17), g(2), g(15), ObjectKind::Floor(Surface::Stone)),
        // Central plaza, wide enough to walk around the fountain.
        object(g(13), g(13), g(6), g(6), ObjectKind::Floor(Surface::Stone)),
        // Pathways to buildings.
        object(g(6), g(7), g(1), g(8), ObjectKind::Floor(Surface::Stone)),
        object(g(25), g(7), g(1), g(8), ObjectKind::Floor(Surface::Stone)),
        object(g(2), g(15), g(1), g(10), ObjectKind::Floor(Surface::Stone)),
        object(g(2), g(24), g(5), g(1), ObjectKind::Floor(Surface::Stone)),
        object(g(29), g(15), g(1), g(10), ObjectKind::Floor(Surface::Stone)),
        object(g(25), g(24), g(5), g(1), ObjectKind::Floor(Surface::Stone)),
        // Central fountain: water basin ringed by a low border.
        object(g(15), g(15), g(2), g(2), ObjectKind::Water),
        colored(g(14), g(14), g(1), g(4), ObjectKind::Wall, "#94a3b8"),
        colored(g(17), g(14), g(1), g(4), ObjectKind::Wall, "#94a3b8"),
        colored(g(15), g(14), g(2), g(1), ObjectKind::Wall, "#94a3b8"),
        colored(g(15), g(17), g(2), g(1), ObjectKind::Wall, "#94a3b8"),
        // Signage.
        labeled(g(5), g(8), g(1), g(1), ObjectKind::Sign, "Cafe"),
        labeled(g(14), g(7), g(1), g(1), ObjectKind::Sign, "Library"),
        labeled(g(24), g(8), g(1), g(1), ObjectKind::Sign, "Art Hall"),
        labeled(g(5), g(15), g(1), g(1), ObjectKind::Sign, "CS Lab"),
        labeled(g(26), g(15), g(1), g(1), ObjectKind::Sign, "Math"),
        labeled(g(1), g(22), g(1), g(1), ObjectKind::Sign, "Dorms"),
        object(g(8), g(7), g(1), g(1), ObjectKind::Bush),
        object(g(12), g(20), g(1), g(1), ObjectKind::Bush),
        object(g(19), g(20), g(1), g(1), ObjectKind::Bush),
    ];

    // Flower garden around the fountain plus accents near each building.
    for (x, y) in [(12, 12), (19, 12), (12, 19), (19, 19)] {
        objects.push(flower(g(x), g(y), "#ec4899"));
    }
    for (x, y) in [(12, 14), (19, 14), (12, 17), (19, 17)] {
        objects.push(flower(g(x), g(y), "#f59e0b"));
    }
    objects.push(flower(g(4), g(8), "#fff"));
    objects.push(flower(g(8), g(8), "#fff"));
    objects.push(flower(g(23), g(8), "#3b82f6"));
    objects.push(flower(g(27), g(8), "#3b82f6"));
    objects.push(flower(g(3), g(22), "#a855f7"));
    objects.push(flower(g(9), g(22), "#a855f7"));
    objects.push(flower(g(28), g(22), "#ef4444"));
    objects.push(flower(g(22), g(22), "#ef4444"));

    objects.extend([
        building(g(12), g(3), g(8), g(4), "LIBRARY", "#b91c1c"),
        building(g(3), g(4), g(7), g(3), "CAFE", "#854d0e"),
        building(g(22), g(4), g(7), g(3), "ARTS", "#f59e0b"),
        building(g(1), g(12), g(5), g(3), "CS LAB", "#1e293b"),
        object(g(3), g(15), g(1), g(1), ObjectKind::Floor(Surface::Stone)),
        building(g(26), g(12), g(5), g(3), "MATH", "#334155"),
        object(g(28), g(15), g(1), g(1), ObjectKind::Floor(Surface::Stone)),
        building(g(23), g(21), g(5), g(3), "HISTORY", "#7f1d1d"),
        building(g(4), g(21), g(5), g(3), "DORMS", "#4c1d95"),
        // Boundary walls, with gaps for the track and entrance warps.
        object(0, 0, g(32), g(1), ObjectKind::Wall),
        object(0, 0, g(1), g(32), ObjectKind::Wall),
        object(g(31), 0, g(1), g(15), ObjectKind::Wall),
        object(g(31), g(17), g(1), g(15), ObjectKind::Wall),
        object(0, g(31), g(14), g(1), ObjectKind::Wall),
        object(g(18), g(31), g(14), g(1), ObjectKind::Wall),
    ]);

    RoomDefinition {
        id: ROOM_QUAD.to_string(),
        name: "University Quad".to_string(),
        width: g(32),
        height: g(32),
        spawn: Position::new(g(16), g(16)),
        class: RoomClass::Public,
        base_tile: Surface::Grass,
        objects,
        npcs: vec![
            Npc {
                id: "npc_prof",
                name: "Prof. Pingu",
                position: Position::new(g(15), g(8)),
                facing: Direction::Down,
                color: "#4b5563",
                role: NpcRole::Professor,
                department: None,
                dialogues: QUAD_PROF_DIALOGUES,
            },
            Npc {
                id: "npc_student1",
                name: "Freshman Fred",
                position: Position::new(g(12), g(18)),
                facing: Direction::Right,
                color: "#3b82f6",
                role: NpcRole::Student,
                department: None,
                dialogues: QUAD_FRED_DIALOGUES,
            },
            Npc {
                id: "npc_student2",
                name: "Senior Sarah",
                position: Position::new(g(20), g(18)),
                facing: Direction::Left,
                color: "#ec4899",
                role: NpcRole::Student,
                department: None,
                dialogues: QUAD_SARAH_DIALOGUES,
            },
        ],
        warps: vec![
            warp(g(15), g(31), g(2), g(1), ROOM_ENTRANCE, g(10), g(2), Direction::Down, Some("Exit Campus")),
            warp(g(31), g(15), g(1), g(2), ROOM_TRACK, g(2), g(10), Direction::Right, Some("Track & Field")),
            warp(g(15), g(6), g(2), g(1), ROOM_LIBRARY, g(8), g(10), Direction::Up, None),
            warp(g(6), g(6), g(1), g(1), ROOM_CAFE, g(6), g(8), Direction::Up, None),
            warp(g(3), g(14), g(1), g(1), ROOM_COURSE_CS, g(6), g(10), Direction::Up, None),
            warp(g(28), g(14), g(1), g(1), ROOM_COURSE_MATH, g(6), g(10), Direction::Up, None),
            warp(g(25), g(6), g(1), g(1), ROOM_COURSE_ART, g(6), g(10), Direction::Up, None),
            warp(g(25), g(23), g(1), g(1), ROOM_COURSE_HISTORY, g(6), g(10), Direction::Up, None),
            warp(g(6), g(23), g(1), g(1), DORM_WARP_TARGET, g(5), g(8), Direction::Down, Some("To Dorms")),
        ],
    }
}

fn track() -> RoomDefinition {
    const LANE: &str = "rgba(255,255,255,0.4)";
    const LINE: &str = "rgba(255,255,255,0.9)";

    let mut objects = vec![
        // Stadium seating ring with a gap at the quad exit.
        object(0, 0, g(24), g(2), ObjectKind::StadiumSeating),
        object(0, g(18), g(24), g(2), ObjectKind::StadiumSeating),
        object(g(22), g(2), g(2), g(16), ObjectKind::StadiumSeating),
        object(0, g(2), g(2), g(7), ObjectKind::StadiumSeating),
        object(0, g(11), g(2), g(7), ObjectKind::StadiumSeating),
        object(0, g(9), g(2), g(2), ObjectKind::Floor(Surface::Stone)),
        object(g(2), g(2), g(20), g(16), ObjectKind::Floor(Surface::Clay)),
    ];

    // Lane markings: thin decorative floor strips.
    for x in [g(3), g(4), g(20), g(21)] {
        objects.push(colored(x, g(2), 2, g(16), ObjectKind::Floor(Surface::Tile), LANE));
    }
    for y in [g(3), g(4), g(16), g(17)] {
        objects.push(colored(g(2), y, g(20), 2, ObjectKind::Floor(Surface::Tile), LANE));
    }

    objects.extend([
        // Infield pitch.
        object(g(5), g(4), g(14), g(12), ObjectKind::Floor(Surface::Grass)),
        colored(g(5), g(10) - 3, g(14), 6, ObjectKind::Floor(Surface::Tile), LINE),
        colored(
            g(11) + TILE_SIZE / 2,
            g(9) + TILE_SIZE / 2,
            g(1),
            g(1),
            ObjectKind::PenaltySpot { decorative: true },
            "#fff",
        ),
        // Penalty box lines.
        colored(g(9), g(4), 6, g(3), ObjectKind::Floor(Surface::Tile), LINE),
        colored(g(15), g(4), 6, g(3), ObjectKind::Floor(Surface::Tile), LINE),
        colored(g(9), g(7), g(6) + 6, 6, ObjectKind::Floor(Surface::Tile), LINE),
        colored(g(10), g(4), 6, g(1) + TILE_SIZE / 2, ObjectKind::Floor(Surface::Tile), LINE),
        colored(g(14), g(4), 6, g(1) + TILE_SIZE / 2, ObjectKind::Floor(Surface::Tile), LINE),
        colored(g(10), g(5) + TILE_SIZE / 2, g(4) + 6, 6, ObjectKind::Floor(Surface::Tile), LINE),
        // The playable penalty spot and its goal.
        object(g(11) + TILE_SIZE / 2, g(6), g(1), g(1), ObjectKind::PenaltySpot { decorative: false }),
        object(g(11), g(2), g(2), g(2), ObjectKind::SoccerGoal),
        // Sprint start and signage.
        colored(g(9), g(15), g(1), g(2), ObjectKind::SprintFlag, "#000"),
        labeled(g(12), g(15), g(1), g(1), ObjectKind::Sign, "100m Dash"),
        colored(g(2), g(2), g(1), g(2), ObjectKind::Flag, "#3b82f6"),
        colored(g(21), g(2), g(1), g(2), ObjectKind::Flag, "#f59e0b"),
        colored(g(2), g(16), g(1), g(2), ObjectKind::Flag, "#10b981"),
        colored(g(21), g(16), g(1), g(2), ObjectKind::Flag, "#ec4899"),
    ]);

    RoomDefinition {
        id: ROOM_TRACK.to_string(),
        name: "Track & Field".to_string(),
        width: g(24),
        height: g(20),
        spawn: Position::new(g(2), g(10)),
        class: RoomClass::Public,
        base_tile: Surface::Grass,
        objects,
        npcs: vec![],
        warps: vec![warp(
            0,
            g(9),
            g(1),
            g(2),
            ROOM_QUAD,
            g(30),
            g(16),
            Direction::Left,
            Some("Back to Quad"),
        )],
    }
}

const LIBRARIAN_DIALOGUES: &[&str] = &[
    "Shhh!",
    "Books returned late will incur a fine.",
    "The restricted section is closed.",
];

fn library() -> RoomDefinition {
    RoomDefinition {
        id: ROOM_LIBRARY.to_string(),
        name: "Grand Library".to_string(),
        width: g(16),
        height: g(12),
        spawn: Position::new(g(8), g(10)),
        class: RoomClass::Public,
        base_tile: Surface::Tile,
        objects: vec![
            object(g(6), g(2), g(4), g(2), ObjectKind::Desk),
            object(g(2), g(4), g(2), g(6), ObjectKind::Desk),
            object(g(12), g(4), g(2), g(6), ObjectKind::Desk),
            object(g(4), g(6), g(2), g(1), ObjectKind::StudyDesk),
            object(g(4), g(8), g(2), g(1), ObjectKind::StudyDesk),
            object(g(10), g(6), g(2), g(1), ObjectKind::StudyDesk),
            object(g(10), g(8), g(2), g(1), ObjectKind::StudyDesk),
        ],
        npcs: vec![Npc {
            id: "npc_lib",
            name: "Librarian",
            position: Position::new(g(8), g(3)),
            facing: Direction::Down,
            color: "#9ca3af",
            role: NpcRole::Professor,
            department: None,
            dialogues: LIBRARIAN_DIALOGUES,
        }],
        warps: vec![warp(
            g(7),
            g(11),
            g(2),
            g(1),
            ROOM_QUAD,
            g(16),
            g(8),
            Direction::Down,
            Some("Exit"),
        )],
    }
}

fn cafe() -> RoomDefinition {
    RoomDefinition {
        id: ROOM_CAFE.to_string(),
        name: "Student Cafe".to_string(),
        width: g(16),
        height: g(14),
        spawn: Position::new(g(8), g(11)),
        class: RoomClass::Public,
        base_tile: Surface::Wood,
        objects: vec![
            // Service counter along the top with props on it.
            object(0, 0, g(16), g(2), ObjectKind::Desk),
            object(g(2), TILE_SIZE / 2, g(1), g(1), ObjectKind::Prop(PropKind::Coffee)),
            object(g(12), TILE_SIZE / 2, g(1), g(1), ObjectKind::Prop(PropKind::Coffee)),
            object(g(7) + TILE_SIZE / 2, TILE_SIZE / 2, g(1), g(1), ObjectKind::Prop(PropKind::Plant)),
            // Left table group.
            object(g(3), g(5), g(3), g(2), ObjectKind::Desk),
            object(g(4), g(5), g(1), g(1), ObjectKind::Prop(PropKind::Coffee)),
            object(g(3), g(4), g(1), g(1), ObjectKind::Chair),
            object(g(5), g(4), g(1), g(1), ObjectKind::Chair),
            object(g(3), g(7), g(1), g(1), ObjectKind::Chair),
            object(g(5), g(7), g(1), g(1), ObjectKind::Chair),
            // Right table group.
            object(g(10), g(5), g(3), g(2), ObjectKind::Desk),
            object(g(11), g(5), g(1), g(1), ObjectKind::Prop(PropKind::Plant)),
            object(g(10), g(4), g(1), g(1), ObjectKind::Chair),
            object(g(12), g(4), g(1), g(1), ObjectKind::Chair),
            object(g(10), g(7), g(1), g(1), ObjectKind::Chair),
            object(g(12), g(7), g(1), g(1), ObjectKind::Chair),
            object(0, g(12), g(1), g(2), ObjectKind::Prop(PropKind::Plant)),
            object(g(15), g(12), g(1), g(2), ObjectKind::Prop(PropKind::Plant)),
        ],
        npcs: vec![],
        warps: vec![warp(
            g(7),
            g(13),
            g(2),
            g(1),
            ROOM_QUAD,
            g(6),
            g(8),
            Direction::Down,
            Some("Exit"),
        )],
    }
}

struct CourseHallPlan {
    id: &'static str,
    name: &'static str,
    base_tile: Surface,
    board_label: &'static str,
    lectern_prop: PlacedObject,
    study_desks: &'static [(i32, i32)],
    extra: Vec<PlacedObject>,
    professor: Npc,
    student: Npc,
    exit_target: (i32, i32),
}

/// All four course halls share one 12x14 floor plan; only the dressing and
/// the professor change.
fn course_hall(plan: CourseHallPlan) -> RoomDefinition {
    let mut objects = vec![
        labeled(g(3), 0, g(6), g(1), ObjectKind::Blackboard, plan.board_label),
        object(g(4), g(3), g(4), g(1), ObjectKind::Desk),
        plan.lectern_prop,
        object(g(5), g(3) + 8, 20, 16, ObjectKind::Prop(PropKind::Papers)),
    ];
    for &(x, y) in plan.study_desks {
        objects.push(object(g(x), g(y), g(2), g(1), ObjectKind::StudyDesk));
    }
    objects.extend(plan.extra);

    RoomDefinition {
        id: plan.id.to_string(),
        name: plan.name.to_string(),
        width: g(12),
        height: g(14),
        spawn: Position::new(g(6), g(12)),
        class: RoomClass::Course,
        base_tile: plan.base_tile,
        objects,
        npcs: vec![plan.professor, plan.student],
        warps: vec![warp(
            g(5),
            g(13),
            g(2),
            g(1),
            ROOM_QUAD,
            plan.exit_target.0,
            plan.exit_target.1,
            Direction::Down,
            Some("Exit"),
        )],
    }
}

const PROF_CS_DIALOGUES: &[&str] = &[
    "Ready to test your algorithm knowledge?",
    "Coding is poetry.",
    "Debugging is the essence of life.",
];
const STUDENT_CS_DIALOGUES: &[&str] = &[
    "My code compiles but it does nothing.",
    "Have you tried turning it off and on again?",
    "I love Python!",
];
const PROF_MATH_DIALOGUES: &[&str] = &[
    "Numbers never lie.",
    "Can you solve for X?",
    "Calculus is beautiful.",
];
const STUDENT_MATH_DIALOGUES: &[&str] = &[
    "I dreamt of numbers last night.",
    "Geometry is pointless... wait, no it's not.",
];
const PROF_ART_DIALOGUES: &[&str] = &[
    "Express yourself!",
    "There are no mistakes, only happy accidents.",
];
const STUDENT_ART_DIALOGUES: &[&str] = &[
    "I ran out of blue paint again.",
    "This sculpture speaks to me.",
    "Abstract art is the best.",
];
const PROF_HIST_DIALOGUES: &[&str] = &[
    "Those who forget history are doomed to repeat it.",
    "The past is alive here.",
];
const STUDENT_HIST_DIALOGUES: &[&str] = &[
    "I wish I could time travel.",
    "The Roman Empire was fascinating.",
    "Did you finish the reading on the Cold War?",
];

fn course_cs() -> RoomDefinition {
    course_hall(CourseHallPlan {
        id: ROOM_COURSE_CS,
        name: "Computer Science Lab",
        base_tile: Surface::Tile,
        board_label: "CS",
        lectern_prop: object(
            g(5) + TILE_SIZE / 2,
            g(3) + 4,
            g(1),
            g(1),
            ObjectKind::Prop(PropKind::Laptop),
        ),
        study_desks: &[(2, 6), (5, 6), (8, 6), (2, 9), (5, 9), (8, 9)],
        extra: vec![
            object(0, g(1), g(2), g(4), ObjectKind::Computer),
            object(g(10), g(1), g(2), g(4), ObjectKind::Computer),
        ],
        professor: Npc {
            id: "npc_prof_cs",
            name: "Prof. Bitwise",
            position: Position::new(g(6), g(2)),
            facing: Direction::Down,
            color: "#10b981",
            role: NpcRole::QuizMaster,
            department: Some(Department::Cs),
            dialogues: PROF_CS_DIALOGUES,
        },
        student: Npc {
            id: "npc_student_cs1",
            name: "Coder Cody",
            position: Position::new(g(2), g(5)),
            facing: Direction::Right,
            color: "#3b82f6",
            role: NpcRole::Student,
            department: None,
            dialogues: STUDENT_CS_DIALOGUES,
        },
        exit_target: (g(3), g(16)),
    })
}

fn course_math() -> RoomDefinition {
    course_hall(CourseHallPlan {
        id: ROOM_COURSE_MATH,
        name: "Mathematics Hall",
        base_tile: Surface::Tile,
        board_label: "MATH",
        lectern_prop: object(g(6), g(3) + 4, g(1), g(1), ObjectKind::Prop(PropKind::Books)),
        study_desks: &[(3, 6), (7, 6), (3, 9), (7, 9)],
        extra: vec![],
        professor: Npc {
            id: "npc_prof_math",
            name: "Prof. Algebra",
            position: Position::new(g(6), g(2)),
            facing: Direction::Down,
            color: "#6366f1",
            role: NpcRole::QuizMaster,
            department: Some(Department::Math),
            dialogues: PROF_MATH_DIALOGUES,
        },
        student: Npc {
            id: "npc_student_math1",
            name: "Mathematician Mike",
            position: Position::new(g(8), g(5)),
            facing: Direction::Left,
            color: "#f59e0b",
            role: NpcRole::Student,
            department: None,
            dialogues: STUDENT_MATH_DIALOGUES,
        },
        exit_target: (g(29), g(16)),
    })
}

fn course_art() -> RoomDefinition {
    course_hall(CourseHallPlan {
        id: ROOM_COURSE_ART,
        name: "Art Studio",
        base_tile: Surface::Wood,
        board_label: "ART",
        lectern_prop: object(
            g(7) + TILE_SIZE / 2,
            g(3),
            g(1),
            g(2),
            ObjectKind::Prop(PropKind::Easel),
        ),
        study_desks: &[(2, 6), (8, 6), (2, 9), (8, 9)],
        // Statue stand in the middle of the studio.
        extra: vec![object(g(5), g(7), g(2), g(2), ObjectKind::Desk)],
        professor: Npc {
            id: "npc_prof_art",
            name: "Prof. Palette",
            position: Position::new(g(6), g(2)),
            facing: Direction::Down,
            color: "#f43f5e",
            role: NpcRole::QuizMaster,
            department: Some(Department::Art),
            dialogues: PROF_ART_DIALOGUES,
        },
        student: Npc {
            id: "npc_student_art1",
            name: "Artsy Anna",
            position: Position::new(g(2), g(5)),
            facing: Direction::Right,
            color: "#ec4899",
            role: NpcRole::Student,
            department: None,
            dialogues: STUDENT_ART_DIALOGUES,
        },
        exit_target: (g(25), g(9)),
    })
}

fn course_history() -> RoomDefinition {
    course_hall(CourseHallPlan {
        id: ROOM_COURSE_HISTORY,
        name: "History Hall",
        base_tile: Surface::Wood,
        board_label: "HISTORY",
        lectern_prop: object(g(4) + 26, g(3) + 4, g(1), g(1), ObjectKind::Prop(PropKind::Globe)),
        study_desks: &[(2, 6), (8, 6), (2, 9), (8, 9)],
        extra: vec![],
        professor: Npc {
            id: "npc_prof_hist",
            name: "Prof. Ancient",
            position: Position::new(g(6), g(2)),
            facing: Direction::Down,
            color: "#78350f",
            role: NpcRole::QuizMaster,
            department: Some(Department::History),
            dialogues: PROF_HIST_DIALOGUES,
        },
        student: Npc {
            id: "npc_student_hist1",
            name: "History Hank",
            position: Position::new(g(8), g(5)),
            facing: Direction::Left,
            color: "#4b5563",
            role: NpcRole::Student,
            department: None,
            dialogues: STUDENT_HIST_DIALOGUES,
        },
        exit_target: (g(25), g(24)),
    })
}

/// Per-player private room, synthesized on demand. Never stored in the
/// catalog: it exists only as a function of the room id.
fn dorm_room(room_id: &str) -> RoomDefinition {
    RoomDefinition {
        id: room_id.to_string(),
        name: "Dorm Room".to_string(),
        width: g(10),
        height: g(10),
        spawn: Position::new(g(5), g(8)),
        class: RoomClass::Private,
        base_tile: Surface::Wood,
        objects: vec![
            object(g(1), g(1), g(3), g(4), ObjectKind::Bed),
            object(g(6), g(1), g(3), g(1), ObjectKind::StudyDesk),
            object(g(6), g(2), g(1), g(1), ObjectKind::Chair),
            object(g(9), 0, g(1), g(2), ObjectKind::Prop(PropKind::Plant)),
        ],
        npcs: vec![],
        warps: vec![warp(
            g(4),
            g(9),
            g(2),
            g(1),
            ROOM_QUAD,
            g(7),
            g(24),
            Direction::Down,
            Some("To Quad"),
        )],
    }
}

/// All room definitions, validated once at startup.
pub struct RoomCatalog {
    rooms: HashMap<String, RoomDefinition>,
}

impl RoomCatalog {
    /// Builds and validates every static room, including the warp graph.
    /// Malformed room data fails here, before anything renders.
    pub fn new() -> Result<Self> {
        let rooms: Vec<RoomDefinition> = vec![
            entrance(),
            quad(),
            track(),
            library(),
            cafe(),
            course_cs(),
            course_math(),
            course_art(),
            course_history(),
        ];

        let mut by_id = HashMap::new();
        for room in rooms {
            room.validate()
                .with_context(|| format!("invalid room definition '{}'", room.id))?;
            if by_id.insert(room.id.clone(), room).is_some() {
                bail!("duplicate room id");
            }
        }

        let dorm_template = dorm_room("dorm_template");
        dorm_template.validate().context("invalid dorm template")?;

        // Cross-room check: every warp must target a resolvable room and land
        // inside its bounds.
        let catalog = Self { rooms: by_id };
        for room in catalog.rooms.values().chain(std::iter::once(&dorm_template)) {
            for w in &room.warps {
                let target = if w.target_room == DORM_WARP_TARGET {
                    dorm_template.clone()
                } else {
                    match catalog.rooms.get(w.target_room) {
                        Some(t) => t.clone(),
                        None => bail!(
                            "room '{}' warps to unknown room '{}'",
                            room.id,
                            w.target_room
                        ),
                    }
                };
                let p = w.target_position;
                if p.x < 0 || p.y < 0 || p.x >= target.width || p.y >= target.height {
                    bail!(
                        "room '{}' warp lands outside '{}' at ({}, {})",
                        room.id,
                        w.target_room,
                        p.x,
                        p.y
                    );
                }
            }
        }

        Ok(catalog)
    }

    /// The private-room id for a player.
    pub fn dorm_room_id(player_id: &str) -> String {
        format!("{DORM_PREFIX}{player_id}")
    }

    pub fn is_dorm(room_id: &str) -> bool {
        room_id.starts_with(DORM_PREFIX)
    }

    /// Looks up a room definition. Private rooms are synthesized from the id;
    /// unknown ids fall back to the entrance.
    pub fn room_details(&self, room_id: &str) -> RoomDefinition {
        if let Some(room) = self.rooms.get(room_id) {
            return room.clone();
        }
        if Self::is_dorm(room_id) {
            return dorm_room(room_id);
        }
        log::warn!("unknown room '{room_id}', falling back to '{ROOM_ENTRANCE}'");
        self.rooms
            .get(ROOM_ENTRANCE)
            .cloned()
            .expect("entrance room always present")
    }

    pub fn static_room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_and_validates() {
        let catalog = RoomCatalog::new().expect("static rooms are valid");
        assert_eq!(catalog.static_room_ids().count(), 9);
    }

    #[test]
    fn dorm_rooms_are_synthesized_deterministically() {
        let catalog = RoomCatalog::new().unwrap();
        let id = RoomCatalog::dorm_room_id("player-42");
        assert_eq!(id, "dorm_player-42");

        let a = catalog.room_details(&id);
        let b = catalog.room_details(&id);
        assert_eq!(a.id, id);
        assert_eq!(a.class, RoomClass::Private);
        assert_eq!(a.width, b.width);
        assert_eq!(a.objects.len(), b.objects.len());
        // Synthesized, not stored.
        assert!(!catalog.static_room_ids().any(|r| r == id));
    }

    #[test]
    fn unknown_room_falls_back_to_entrance() {
        let catalog = RoomCatalog::new().unwrap();
        let room = catalog.room_details("no_such_room");
        assert_eq!(room.id, ROOM_ENTRANCE);
    }

    #[test]
    fn blocking_geometry_is_tile_aligned_everywhere() {
        let catalog = RoomCatalog::new().unwrap();
        for id in catalog.static_room_ids().map(str::to_string).collect::<Vec<_>>() {
            let room = catalog.room_details(&id);
            for obj in &room.objects {
                if obj.kind.blocks() {
                    assert!(
                        obj.rect.is_tile_aligned(),
                        "room {id}: blocking {:?} misaligned",
                        obj.kind
                    );
                }
            }
        }
    }

    #[test]
    fn malformed_room_fails_validation() {
        let mut room = dorm_room("dorm_x");
        room.width = g(10) + 7;
        assert!(room.validate().is_err());

        let mut room = dorm_room("dorm_x");
        room.objects.push(PlacedObject::new(
            Rect::new(3, 3, 10, 10),
            ObjectKind::Wall,
        ));
        assert!(room.validate().is_err());
    }
}
