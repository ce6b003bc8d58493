use crate::chat::ChatHandler;
use crate::inventory_check::{check_inventory, list_items_in_state, list_update_queue, ItemStateQuery};
use world_core::types::ValueSlots;

impl ChatHandler {
    /// `itemstate <unchanged|changed|new|removed|queue|all>` on the selected
    /// player, or the GM.
    pub fn handle_debug_item_state(&mut self, args: &str) -> bool {
        let Some(query) = ItemStateQuery::parse(args.trim()) else {
            return false;
        };

        let target = self
            .selected_player_guid()
            .unwrap_or_else(|| self.gm_guid());
        let Some(player) = self.world().player(target) else {
            return false;
        };

        let lines = match query {
            ItemStateQuery::State(state) => list_items_in_state(&player.inventory, state),
            ItemStateQuery::Queue => list_update_queue(&player.inventory),
            ItemStateQuery::All => {
                let report = check_inventory(&player.inventory, &player.guid_str());
                log::debug!(
                    "itemstate of {}: {} violations, update queue {}",
                    player.guid_str(),
                    report.violations.len(),
                    if report.queue_empty { "empty" } else { "pending" }
                );
                report.lines()
            }
        };
        self.send_sys_lines(lines);
        true
    }
}
