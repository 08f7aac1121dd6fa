//! The command interpreter.
//!
//! Input starting with `$` is a client command, input starting with `%`
//! is a script line for the server's command interpreter; anything else
//! is said in chat by the active player. Command output goes straight
//! to stdout — diagnostics go through tracing.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::{Mutex, OwnedMutexGuard};

use embershell_engine::{
    AttributesData, CharacterData, Container, Killable, Module, ObjectRef,
};
use embershell_game::{Game, LoginStatus, Player};
use embershell_net::Session;

use crate::config::Config;
use crate::data::{self, ClientSave};
use crate::lang::Lang;

pub const COMMAND_PREFIX: &str = "$";
pub const SCRIPT_PREFIX: &str = "%";
pub const INPUT_INDICATOR: &str = "> ";

const STARTING_HEALTH: i32 = 100;

/// Interpreter state: the shared facade plus everything that only the
/// presentation layer cares about.
pub struct Cli {
    game: Arc<Mutex<Game>>,
    config: Config,
    lang: Lang,
    /// Characters created with `newchar`, ready for `newgame`.
    roster: Vec<CharacterData>,
    /// Dialog currently on screen: (owner, dialog ID).
    dialog: Option<(ObjectRef, String)>,
    closed: bool,
}

impl Cli {
    pub fn new(game: Arc<Mutex<Game>>, config: Config, lang: Lang) -> Self {
        Self {
            game,
            config,
            lang,
            roster: Vec::new(),
            dialog: None,
            closed: false,
        }
    }

    /// Whether `close` has been executed.
    pub fn should_close(&self) -> bool {
        self.closed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn lock(&self) -> OwnedMutexGuard<Game> {
        Arc::clone(&self.game).lock_owned().await
    }

    /// Handles one line of user input.
    pub async fn handle_input(&mut self, line: &str) {
        let input = line.trim();
        if input.is_empty() {
            return;
        }
        if let Some(command) = input.strip_prefix(COMMAND_PREFIX) {
            self.execute(command.trim()).await;
            return;
        }
        if let Some(script) = input.strip_prefix(SCRIPT_PREFIX) {
            self.run_script(script.trim()).await;
            return;
        }
        let mut game = self.lock().await;
        match game.active_player() {
            Some(mut player) => player.add_chat_message(input).await,
            None => println!("{input}"),
        }
    }

    async fn execute(&mut self, command: &str) {
        let args: Vec<&str> = command.split_whitespace().collect();
        let Some(&name) = args.first() else {
            return;
        };
        let args = &args[1..];
        match name {
            "close" => self.cmd_close().await,
            "help" => cmd_help(),
            "newchar" => self.cmd_newchar(args),
            "chars" => self.cmd_chars(),
            "newgame" => self.cmd_newgame(args).await,
            "login" => self.cmd_login().await,
            "savegame" => self.cmd_savegame(args).await,
            "loadgame" => self.cmd_loadgame(args).await,
            "players" => self.cmd_players().await,
            "pc" => self.cmd_pc(args).await,
            "move" => self.cmd_move(args).await,
            "target" => self.cmd_target(args).await,
            "tarinfo" => self.cmd_tarinfo().await,
            "inventory" => self.cmd_inventory().await,
            "equipment" => self.cmd_equipment().await,
            "equip" => self.cmd_equip(args).await,
            "unequip" => self.cmd_unequip(args).await,
            "use" => self.cmd_use(args).await,
            "loot" => self.cmd_loot().await,
            "trade" => self.cmd_trade(args).await,
            "talk" => self.cmd_talk(args).await,
            "answer" => self.cmd_answer(args).await,
            "chat" => self.cmd_chat().await,
            "cmd" => self.cmd_server_command(args).await,
            _ => println!("{}: {name}", self.lang.text("unknown_command")),
        }
    }

    async fn cmd_close(&mut self) {
        let game = self.lock().await;
        if let Some(session) = game.session() {
            let session = Arc::clone(session);
            drop(game);
            session.close().await;
        }
        self.closed = true;
    }

    fn cmd_newchar(&mut self, args: &[&str]) {
        let Some(id) = args.first() else {
            println!("usage: {COMMAND_PREFIX}newchar <id> [name]");
            return;
        };
        let name = args[1..].join(" ");
        let data = CharacterData {
            id: id.to_string(),
            serial: format!("{:08x}", rand::rng().random::<u32>()),
            name: if name.is_empty() { id.to_string() } else { name },
            level: 1,
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            attributes: AttributesData::default(),
            ..Default::default()
        };
        println!(
            "{}: {}#{} ({})",
            self.lang.text("newchar_created"),
            data.id,
            data.serial,
            data.name
        );
        self.roster.push(data);
    }

    fn cmd_chars(&self) {
        for (i, c) in self.roster.iter().enumerate() {
            println!("[{i}] {}#{} ({})", c.id, c.serial, c.name);
        }
    }

    /// Starts a game with a roster character. Locally the character is
    /// spawned at once; with a server attached it is held back until
    /// the login handshake completes.
    async fn cmd_newgame(&mut self, args: &[&str]) {
        let index: usize = match args.first().map(|a| a.parse()) {
            Some(Ok(i)) => i,
            _ => {
                println!("usage: {COMMAND_PREFIX}newgame <character index>");
                return;
            }
        };
        let Some(character) = self.roster.get(index).cloned() else {
            println!("{}: {index}", self.lang.text("newgame_no_such_char"));
            return;
        };

        let mut game = self.lock().await;
        if let Some(session) = game.session() {
            let session = Arc::clone(session);
            if let Err(e) = session.new_character(character.clone()).await {
                println!("{}: {e}", self.lang.text("newgame_send_error"));
                return;
            }
            game.set_pending_player(character);
            drop(game);
            self.send_login(&session).await;
            return;
        }
        match game.spawn_player(character) {
            Ok(r) => println!("{}: {r}", self.lang.text("newgame_started")),
            Err(e) => println!("{}: {e}", self.lang.text("newgame_error")),
        }
    }

    async fn cmd_login(&mut self) {
        let game = self.lock().await;
        let Some(session) = game.session().map(Arc::clone) else {
            println!("{}", self.lang.text("no_server_connection"));
            return;
        };
        drop(game);
        self.send_login(&session).await;
    }

    async fn send_login(&self, session: &Session) {
        let Some(server) = &self.config.server else {
            println!("{}", self.lang.text("no_server_connection"));
            return;
        };
        if server.login.is_empty() || server.pass.is_empty() {
            println!("{}", self.lang.text("login_no_credentials"));
            return;
        }
        match session.login(&server.login, &server.pass).await {
            Ok(()) => println!("{}", self.lang.text("login_sent")),
            Err(e) => println!("{}: {e}", self.lang.text("login_send_error")),
        }
    }

    async fn cmd_savegame(&mut self, args: &[&str]) {
        let Some(name) = args.first() else {
            println!("usage: {COMMAND_PREFIX}savegame <name>");
            return;
        };
        let game = self.lock().await;
        if let Some(session) = game.session() {
            let session = Arc::clone(session);
            drop(game);
            if let Err(e) = session.save(name).await {
                println!("{}: {e}", self.lang.text("savegame_send_error"));
            }
            return;
        }
        let Some(module) = game.module() else {
            println!("{}", self.lang.text("no_game_started"));
            return;
        };
        let save = ClientSave {
            name: name.to_string(),
            players: game
                .players()
                .iter()
                .map(|p| p.character().clone())
                .collect(),
            module: module.data(),
        };
        match data::write_save(Path::new(&self.config.saves_dir), &save) {
            Ok(()) => println!("{}: {name}", self.lang.text("savegame_saved")),
            Err(e) => println!("{}: {e}", self.lang.text("savegame_error")),
        }
    }

    /// Loads a save. With a server the load is requested remotely and
    /// state comes back through the reconciler; locally the facade is
    /// rebuilt and every listed player re-resolved against the module.
    async fn cmd_loadgame(&mut self, args: &[&str]) {
        let Some(&name) = args.first() else {
            let saves = data::list_saves(Path::new(&self.config.saves_dir));
            println!("usage: {COMMAND_PREFIX}loadgame <name>");
            for save in saves {
                println!("  {save}");
            }
            return;
        };
        let mut game = self.lock().await;
        if let Some(session) = game.session() {
            let session = Arc::clone(session);
            drop(game);
            if let Err(e) = session.load(name).await {
                println!("{}: {e}", self.lang.text("loadgame_send_error"));
            }
            return;
        }
        let save = match data::read_save(Path::new(&self.config.saves_dir), name)
        {
            Ok(save) => save,
            Err(e) => {
                println!("{}: {e}", self.lang.text("loadgame_error"));
                return;
            }
        };
        *game = Game::new(Some(Module::new(save.module)));
        for player in &save.players {
            let present = game
                .module()
                .is_some_and(|m| m.character(&player.id, &player.serial).is_some());
            if !present {
                tracing::error!(character = %player, "saved player missing from module");
                continue;
            }
            game.add_player(Player::new(player.clone()));
        }
        if let Some(first) = save.players.first() {
            game.set_active_player(first);
        }
        println!("{}: {name}", self.lang.text("loadgame_loaded"));
    }

    async fn cmd_players(&self) {
        let game = self.lock().await;
        let active = game.active_player_ref().map(|p| p.character().clone());
        for player in game.players() {
            let marker =
                if active.as_ref() == Some(player.character()) { "*" } else { " " };
            println!("{marker}{}", player.character());
        }
        if game.session().is_some()
            && game.login_status() != LoginStatus::Acknowledged
        {
            println!("login: {:?}", game.login_status());
        }
    }

    async fn cmd_pc(&mut self, args: &[&str]) {
        let Some(character) = parse_ref(args.first()) else {
            println!("usage: {COMMAND_PREFIX}pc <id#serial>");
            return;
        };
        let mut game = self.lock().await;
        if !game.set_active_player(&character) {
            println!("{}: {character}", self.lang.text("no_such_player"));
        }
    }

    async fn cmd_move(&mut self, args: &[&str]) {
        let (Some(Ok(x)), Some(Ok(y))) = (
            args.first().map(|a| a.parse::<f32>()),
            args.get(1).map(|a| a.parse::<f32>()),
        ) else {
            println!("usage: {COMMAND_PREFIX}move <x> <y>");
            return;
        };
        let mut game = self.lock().await;
        match game.active_player() {
            Some(mut player) => player.set_dest_point(x, y).await,
            None => println!("{}", self.lang.text("no_active_player")),
        }
    }

    async fn cmd_target(&mut self, args: &[&str]) {
        let mut game = self.lock().await;
        let target = match args.first() {
            Some(&"clear") => None,
            other => {
                let Some(target) = parse_ref(other) else {
                    println!("usage: {COMMAND_PREFIX}target <id#serial>|clear");
                    return;
                };
                let present = game
                    .module()
                    .is_some_and(|m| m.character(&target.id, &target.serial).is_some());
                if !present {
                    println!("{}: {target}", self.lang.text("no_such_character"));
                    return;
                }
                Some(target)
            }
        };
        match game.active_player() {
            Some(mut player) => player.set_target(target).await,
            None => println!("{}", self.lang.text("no_active_player")),
        }
    }

    async fn cmd_tarinfo(&self) {
        let game = self.lock().await;
        let Some(target) = self.active_target(&game) else {
            println!("{}", self.lang.text("no_target"));
            return;
        };
        let Some(character) = game
            .module()
            .and_then(|m| m.character(&target.id, &target.serial))
        else {
            println!("{}: {target}", self.lang.text("no_such_character"));
            return;
        };
        println!("{} ({})", character.name(), character.object_ref());
        println!(
            "level {} | {}/{} hp{}",
            character.level(),
            character.health(),
            character.max_health(),
            if character.alive() { "" } else { " (dead)" }
        );
        let pos = character.position();
        println!("position: {:.0}, {:.0}", pos.x, pos.y);
    }

    async fn cmd_inventory(&self) {
        let game = self.lock().await;
        let Some(character) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        for item in character.inventory().items() {
            println!("{}#{}", item.id(), item.serial());
        }
    }

    async fn cmd_equipment(&self) {
        let game = self.lock().await;
        let Some(character) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        for slot in character.equipment().slots() {
            match slot.item() {
                Some(item) => println!("{:?}: {item}", slot.kind()),
                None => println!("{:?}: -", slot.kind()),
            }
        }
    }

    async fn cmd_equip(&mut self, args: &[&str]) {
        let Some(item_ref) = parse_ref(args.first()) else {
            println!("usage: {COMMAND_PREFIX}equip <id#serial>");
            return;
        };
        let mut game = self.lock().await;
        let Some(item) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
            .and_then(|c| c.inventory().item(&item_ref.id, &item_ref.serial))
            .cloned()
        else {
            println!("{}: {item_ref}", self.lang.text("no_such_item"));
            return;
        };
        let Some(mut player) = game.active_player() else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        match player.equip(&item).await {
            Ok(()) => println!("{}: {item_ref}", self.lang.text("equip_done")),
            Err(e) => println!("{}: {e}", self.lang.text("equip_error")),
        }
    }

    async fn cmd_unequip(&mut self, args: &[&str]) {
        let Some(item_ref) = parse_ref(args.first()) else {
            println!("usage: {COMMAND_PREFIX}unequip <id#serial>");
            return;
        };
        let mut game = self.lock().await;
        let Some(item) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
            .and_then(|c| c.inventory().item(&item_ref.id, &item_ref.serial))
            .cloned()
        else {
            println!("{}: {item_ref}", self.lang.text("no_such_item"));
            return;
        };
        let Some(mut player) = game.active_player() else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        player.unequip(&item).await;
    }

    async fn cmd_use(&mut self, args: &[&str]) {
        let Some(item_ref) = parse_ref(args.first()) else {
            println!("usage: {COMMAND_PREFIX}use <id#serial>");
            return;
        };
        let mut game = self.lock().await;
        let Some(item) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
            .and_then(|c| c.inventory().item(&item_ref.id, &item_ref.serial))
            .cloned()
        else {
            println!("{}: {item_ref}", self.lang.text("no_such_item"));
            return;
        };
        let Some(mut player) = game.active_player() else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        player.use_object(&item).await;
    }

    /// Takes everything from a dead target's inventory.
    async fn cmd_loot(&mut self) {
        let mut game = self.lock().await;
        let Some(player) = game.active_player_ref().map(|p| p.character().clone())
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        let Some(target) = self.active_target(&game) else {
            println!("{}", self.lang.text("no_target"));
            return;
        };
        let Some(character) = game
            .module()
            .and_then(|m| m.character(&target.id, &target.serial))
        else {
            println!("{}: {target}", self.lang.text("no_such_character"));
            return;
        };
        if character.alive() {
            println!("{}", self.lang.text("loot_target_alive"));
            return;
        }
        let items: Vec<ObjectRef> = character
            .inventory()
            .items()
            .iter()
            .map(|i| ObjectRef::new(i.id(), i.serial()))
            .collect();
        if items.is_empty() {
            println!("{}", self.lang.text("loot_nothing"));
            return;
        }
        match game.transfer_items(&target, &player, &items).await {
            Ok(()) => println!("{}: {}", self.lang.text("loot_taken"), items.len()),
            Err(e) => println!("{}: {e}", self.lang.text("loot_error")),
        }
    }

    /// One-for-one barter with the current target: give one item, take
    /// one item.
    async fn cmd_trade(&mut self, args: &[&str]) {
        let (Some(sell), Some(buy)) =
            (parse_ref(args.first()), parse_ref(args.get(1)))
        else {
            println!(
                "usage: {COMMAND_PREFIX}trade <give id#serial> <take id#serial>"
            );
            return;
        };
        let mut game = self.lock().await;
        let Some(player) = game.active_player_ref().map(|p| p.character().clone())
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        let Some(target) = self.active_target(&game) else {
            println!("{}", self.lang.text("no_target"));
            return;
        };
        match game
            .trade(&target, &player, &[sell], &[buy])
            .await
        {
            Ok(()) => println!("{}", self.lang.text("trade_done")),
            Err(e) => println!("{}: {e}", self.lang.text("trade_error")),
        }
    }

    /// Starts a dialog with the current target.
    async fn cmd_talk(&mut self, args: &[&str]) {
        let mut game = self.lock().await;
        let Some(player) = game.active_player_ref().map(|p| p.character().clone())
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        let Some(target) = self.active_target(&game) else {
            println!("{}", self.lang.text("no_target"));
            return;
        };
        let dialog_id = match args.first() {
            Some(id) => id.to_string(),
            None => {
                let first = game
                    .module()
                    .and_then(|m| m.character(&target.id, &target.serial))
                    .and_then(|c| c.dialogs().first())
                    .map(|d| d.id().to_string());
                match first {
                    Some(id) => id,
                    None => {
                        println!("{}", self.lang.text("talk_no_dialogs"));
                        return;
                    }
                }
            }
        };
        match game.start_dialog(&target, &player, &dialog_id).await {
            Ok(()) => {
                self.dialog = Some((target, dialog_id));
                self.print_dialog_stage(&game);
            }
            Err(e) => println!("{}: {e}", self.lang.text("talk_error")),
        }
    }

    /// Answers the dialog on screen.
    async fn cmd_answer(&mut self, args: &[&str]) {
        let Some(&answer_id) = args.first() else {
            println!("usage: {COMMAND_PREFIX}answer <answer id>");
            return;
        };
        let Some((owner, dialog_id)) = self.dialog.clone() else {
            println!("{}", self.lang.text("no_dialog_active"));
            return;
        };
        let mut game = self.lock().await;
        match game.answer_dialog(&owner, &dialog_id, answer_id).await {
            Ok(()) => self.print_dialog_stage(&game),
            Err(e) => println!("{}: {e}", self.lang.text("talk_error")),
        }
    }

    /// Prints the active player's chat log, translating local keys.
    async fn cmd_chat(&self) {
        let game = self.lock().await;
        let Some(character) = game
            .active_player_ref()
            .and_then(|p| game.module()?.character(p.id(), p.serial()))
        else {
            println!("{}", self.lang.text("no_active_player"));
            return;
        };
        for message in character.chat_log() {
            if message.translated {
                println!("{}", message.text);
            } else {
                println!("{}", self.lang.text(&message.text));
            }
        }
    }

    /// Runs a script line through the server's command interpreter.
    /// Without a server the line is only logged.
    async fn run_script(&self, script: &str) {
        if script.is_empty() {
            return;
        }
        let game = self.lock().await;
        let Some(session) = game.session().map(Arc::clone) else {
            tracing::info!(script, "no server to run script");
            println!("{}", self.lang.text("no_server_connection"));
            return;
        };
        drop(game);
        if let Err(e) = session.command(script).await {
            println!("{}: {e}", self.lang.text("command_send_error"));
        }
    }

    /// Forwards a raw engine command to the server.
    async fn cmd_server_command(&self, args: &[&str]) {
        if args.is_empty() {
            println!("usage: {COMMAND_PREFIX}cmd <engine command>");
            return;
        }
        let game = self.lock().await;
        let Some(session) = game.session().map(Arc::clone) else {
            println!("{}", self.lang.text("no_server_connection"));
            return;
        };
        drop(game);
        if let Err(e) = session.command(&args.join(" ")).await {
            println!("{}: {e}", self.lang.text("command_send_error"));
        }
    }

    fn print_dialog_stage(&mut self, game: &Game) {
        let Some((owner, dialog_id)) = &self.dialog else {
            return;
        };
        let Some(dialog) = game
            .module()
            .and_then(|m| m.character(&owner.id, &owner.serial))
            .and_then(|c| c.dialogs().iter().find(|d| d.id() == dialog_id.as_str()))
        else {
            self.dialog = None;
            return;
        };
        if dialog.finished() {
            println!("{}", self.lang.text("dialog_finished"));
            self.dialog = None;
            return;
        }
        let Some(stage) = dialog.active_stage() else {
            return;
        };
        println!("{}", self.lang.text(stage.text()));
        for answer in stage.answers() {
            println!("[{}] {}", answer.id, self.lang.text(&answer.text));
        }
    }

    /// The active player's current target, if any.
    fn active_target(&self, game: &Game) -> Option<ObjectRef> {
        let player = game.active_player_ref()?;
        game.module()?
            .character(player.id(), player.serial())?
            .target()
            .cloned()
    }
}

/// Parses an `id#serial` reference.
fn parse_ref(arg: Option<&&str>) -> Option<ObjectRef> {
    let (id, serial) = arg?.split_once('#')?;
    if id.is_empty() || serial.is_empty() {
        return None;
    }
    Some(ObjectRef::new(id, serial))
}

fn cmd_help() {
    println!("commands (prefix with {COMMAND_PREFIX}):");
    println!("  newchar <id> [name]   create a playable character");
    println!("  chars                 list playable characters");
    println!("  newgame <index>       start a game with a character");
    println!("  login                 log in to the game server");
    println!("  savegame/loadgame <name>");
    println!("  players / pc <id#serial>");
    println!("  move <x> <y>");
    println!("  target <id#serial>|clear / tarinfo");
    println!("  inventory / equipment / equip / unequip / use <id#serial>");
    println!("  loot / trade <give> <take>");
    println!("  talk [dialog] / answer <id>");
    println!("  chat                  show the chat log");
    println!("  cmd <text>            send a raw engine command to the server");
    println!("  close");
    println!("anything without the prefix is said in chat");
}
