//! §5 order step "delete-sweep": the tick's one atomic `World::sweep_deletions`
//! call, plus the free hooks that need to see what a dying entity carried
//! (Testable Property 2: a dead petal's slot resets its cooldown to the
//! petal-data value and clears the back-reference).

use crate::balance;
use crate::ecs::entity::Entity;
use crate::ecs::store::World;

pub fn tick(world: &mut World) {
    let records = world.sweep_deletions();
    for record in records {
        if let Some(petal) = &record.had_petal {
            if let Some(slot_ref) = petal.slot {
                clear_slot(world, slot_ref, petal.id);
            }
        }
        if record.had_player_info.is_some() {
            detach_from_squad(world, record.entity);
        }
    }
}

fn clear_slot(world: &mut World, slot_ref: crate::ecs::components::PetalSlotRef, id: rysteria_protocol::ids::PetalId) {
    let Some(info) = world.get_player_info_mut(slot_ref.flower) else { return };
    let slot = if slot_ref.secondary {
        info.secondary_slots.get_mut(slot_ref.slot_index)
    } else {
        info.slots.get_mut(slot_ref.slot_index)
    };
    let Some(slot) = slot else { return };
    if let Some(entity) = slot.petals.get_mut(slot_ref.petal_index) {
        *entity = Entity::NULL;
    }
    slot.cooldown_ticks = balance::petal_stats(id).cooldown_ticks;
}

fn detach_from_squad(world: &mut World, player_info_entity: Entity) {
    crate::squad::remove_member_everywhere(world, player_info_entity);
}
