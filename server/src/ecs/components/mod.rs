pub mod ai;
pub mod arena;
pub mod centipede;
pub mod drop;
pub mod flower;
pub mod health;
pub mod mob;
pub mod nest;
pub mod petal;
pub mod physical;
pub mod player_info;
pub mod relations;
pub mod squad;
pub mod web;

pub use ai::Ai;
pub use arena::Arena;
pub use centipede::Centipede;
pub use drop::Drop;
pub use flower::{FaceFlags, Flower};
pub use health::Health;
pub use mob::Mob;
pub use nest::Nest;
pub use petal::{Petal, PetalSlotRef};
pub use physical::{Physical, PhysicalFlags};
pub use player_info::{InputFlags, Modifiers, PlayerInfo};
pub use relations::Relations;
pub use squad::{Squad, SquadMember, SQUAD_SLOTS};
pub use web::Web;
