//! Interaction resolver: picks at most one actionable target within range of
//! the resting actor and names the effect to run.

use rand::Rng;

use crate::constants::INTERACTION_RANGE;
use crate::minigame::MinigameKind;
use crate::types::geometry::distance;
use crate::types::{Department, NpcRole, ObjectAction, PresenceRecord, RoomDefinition};

/// The single effect an activation resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Open the study flow for a department (`None` = generic).
    Study { department: Option<Department> },
    /// Open the quiz flow for a department.
    StartQuiz { department: Department },
    /// Show one line of NPC dialogue.
    Dialogue {
        npc_id: &'static str,
        npc_name: &'static str,
        line: &'static str,
    },
    /// Open another player's profile.
    OpenProfile { player_id: String },
    /// Launch an embedded minigame.
    Minigame(MinigameKind),
}

enum Candidate<'a> {
    Object(ObjectAction),
    Npc(&'a crate::types::Npc),
    Player(&'a PresenceRecord),
}

/// Finds the nearest eligible target within `INTERACTION_RANGE` of
/// `actor_center` and returns its effect.
///
/// Pools are scanned in a fixed order — interactive objects, NPCs, other
/// players — and ties resolve to the earlier pool, so resolution is
/// deterministic for equal distances.
pub fn resolve<'a, R: Rng>(
    room: &'a RoomDefinition,
    actor_center: (f32, f32),
    players: &'a [PresenceRecord],
    local_player_id: &str,
    rng: &mut R,
) -> Option<Interaction> {
    let mut closest: f32 = f32::INFINITY;
    let mut best: Option<Candidate<'a>> = None;

    let mut consider = |center: (f32, f32), candidate: Candidate<'a>| {
        let dist = distance(actor_center, center);
        if dist <= INTERACTION_RANGE && dist < closest {
            closest = dist;
            best = Some(candidate);
        }
    };

    for obj in &room.objects {
        if let Some(action) = obj.kind.action() {
            consider(obj.rect.center(), Candidate::Object(action));
        }
    }

    for npc in &room.npcs {
        let center = (
            npc.position.x as f32 + crate::constants::TILE_SIZE as f32 / 2.0,
            npc.position.y as f32 + crate::constants::TILE_SIZE as f32 / 2.0,
        );
        consider(center, Candidate::Npc(npc));
    }

    for player in players {
        if player.id == local_player_id {
            continue;
        }
        let center = (
            player.x + crate::constants::TILE_SIZE as f32 / 2.0,
            player.y + crate::constants::TILE_SIZE as f32 / 2.0,
        );
        consider(center, Candidate::Player(player));
    }

    match best? {
        Candidate::Object(ObjectAction::Study) => Some(Interaction::Study {
            department: Department::from_room_id(&room.id),
        }),
        Candidate::Object(ObjectAction::Penalty) => {
            Some(Interaction::Minigame(MinigameKind::Penalty))
        }
        Candidate::Object(ObjectAction::Sprint) => {
            Some(Interaction::Minigame(MinigameKind::Sprint))
        }
        Candidate::Npc(npc) => match (npc.role, npc.department) {
            (NpcRole::QuizMaster, Some(department)) => {
                Some(Interaction::StartQuiz { department })
            }
            _ => {
                let line = if npc.dialogues.is_empty() {
                    "..."
                } else {
                    npc.dialogues[rng.gen_range(0..npc.dialogues.len())]
                };
                Some(Interaction::Dialogue {
                    npc_id: npc.id,
                    npc_name: npc.name,
                    line,
                })
            }
        },
        Candidate::Player(player) => Some(Interaction::OpenProfile {
            player_id: player.id.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TILE_SIZE;
    use crate::types::{
        Direction, Npc, ObjectKind, PlacedObject, Position, Rect, RoomClass, Surface,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(id: &str) -> RoomDefinition {
        RoomDefinition {
            id: id.to_string(),
            name: "Test".to_string(),
            width: 20 * TILE_SIZE,
            height: 20 * TILE_SIZE,
            spawn: Position::new(0, 0),
            class: RoomClass::Public,
            base_tile: Surface::Grass,
            objects: vec![],
            npcs: vec![],
            warps: vec![],
        }
    }

    fn study_desk_at(gx: i32, gy: i32) -> PlacedObject {
        PlacedObject::new(
            Rect::new(gx * TILE_SIZE, gy * TILE_SIZE, TILE_SIZE, TILE_SIZE),
            ObjectKind::StudyDesk,
        )
    }

    fn npc_at(gx: i32, gy: i32) -> Npc {
        Npc {
            id: "npc_test",
            name: "Testy",
            position: Position::new(gx * TILE_SIZE, gy * TILE_SIZE),
            facing: Direction::Down,
            color: "#fff",
            role: NpcRole::Student,
            department: None,
            dialogues: &["Hello there."],
        }
    }

    fn player_at(id: &str, gx: i32, gy: i32) -> PresenceRecord {
        PresenceRecord {
            id: id.to_string(),
            name: id.to_string(),
            color: "#3b82f6".to_string(),
            room: "test".to_string(),
            x: (gx * TILE_SIZE) as f32,
            y: (gy * TILE_SIZE) as f32,
            facing: Direction::Down,
            moving: false,
            target_x: None,
            target_y: None,
            hat: None,
            glasses: None,
            emote: None,
            last_message: None,
        }
    }

    /// Center of the tile an actor resting at (gx, gy) occupies.
    fn center_of(gx: i32, gy: i32) -> (f32, f32) {
        (
            (gx * TILE_SIZE) as f32 + TILE_SIZE as f32 / 2.0,
            (gy * TILE_SIZE) as f32 + TILE_SIZE as f32 / 2.0,
        )
    }

    #[test]
    fn nothing_in_range_means_no_effect() {
        let mut r = room("quad");
        r.objects.push(study_desk_at(10, 10));
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            resolve(&r, center_of(0, 0), &[], "me", &mut rng),
            None
        );
    }

    #[test]
    fn nearest_candidate_wins() {
        let mut r = room("course_cs");
        // Desk one tile away, NPC 1.5 tiles away on the other side.
        r.objects.push(study_desk_at(6, 5));
        r.npcs.push(npc_at(3, 5));
        let mut rng = StdRng::seed_from_u64(7);

        let got = resolve(&r, center_of(5, 5), &[], "me", &mut rng);
        assert_eq!(
            got,
            Some(Interaction::Study {
                department: Some(Department::Cs)
            })
        );
    }

    #[test]
    fn equal_distance_ties_resolve_to_earlier_pool() {
        let mut r = room("quad");
        // Object and NPC both exactly one tile away.
        r.objects.push(study_desk_at(6, 5));
        r.npcs.push(npc_at(4, 5));
        let mut rng = StdRng::seed_from_u64(7);

        let got = resolve(&r, center_of(5, 5), &[], "me", &mut rng);
        assert!(matches!(got, Some(Interaction::Study { .. })));
    }

    #[test]
    fn quiz_master_opens_quiz_others_talk() {
        let mut r = room("course_math");
        let mut quiz_master = npc_at(5, 4);
        quiz_master.role = NpcRole::QuizMaster;
        quiz_master.department = Some(Department::Math);
        r.npcs.push(quiz_master);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(
            resolve(&r, center_of(5, 5), &[], "me", &mut rng),
            Some(Interaction::StartQuiz {
                department: Department::Math
            })
        );

        let mut r = room("quad");
        r.npcs.push(npc_at(5, 4));
        let got = resolve(&r, center_of(5, 5), &[], "me", &mut rng);
        assert!(matches!(got, Some(Interaction::Dialogue { line: "Hello there.", .. })));
    }

    #[test]
    fn other_players_open_profiles_but_self_is_skipped() {
        let r = room("quad");
        let players = vec![player_at("me", 5, 4), player_at("other", 5, 6)];
        let mut rng = StdRng::seed_from_u64(7);

        let got = resolve(&r, center_of(5, 5), &players, "me", &mut rng);
        assert_eq!(
            got,
            Some(Interaction::OpenProfile {
                player_id: "other".to_string()
            })
        );
    }

    #[test]
    fn out_of_range_targets_are_ignored_at_boundary() {
        let mut r = room("quad");
        // Just over two tile-widths away: 65px > 64px range.
        r.objects.push(PlacedObject::new(
            Rect::new(
                5 * TILE_SIZE + TILE_SIZE / 2 + 65 - TILE_SIZE / 2,
                5 * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            ),
            ObjectKind::StudyDesk,
        ));
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(resolve(&r, center_of(5, 5), &[], "me", &mut rng), None);
    }

    #[test]
    fn generic_department_outside_course_rooms() {
        let mut r = room("library");
        r.objects.push(study_desk_at(5, 4));
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            resolve(&r, center_of(5, 5), &[], "me", &mut rng),
            Some(Interaction::Study { department: None })
        );
    }
}
