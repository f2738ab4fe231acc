use anyhow::Result;
use pokemon_battle_arena::battle::Side;
use pokemon_battle_arena::feedback::{particle_palette, CuePlayer, FeedbackEvent, FeedbackSink, Tone};
use pokemon_battle_arena::model::{Combatant, HpBand};
use pokemon_battle_arena::roster::Roster;
use pokemon_battle_arena::session::{BattleSession, TurnStep};
use pokemon_battle_arena::types::type_effectiveness;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

const BAR_WIDTH: usize = 20;

pub enum BattleCommand {
    Move(usize),
    Potion,
    Surrender,
    FullHeal,
    Exit,
}

pub enum SetupCommand {
    Player(usize),
    Opponent(usize),
    RandomOpponent,
    Start,
    Reset,
    Quit,
}

pub fn clear_screen() {
    print!("\x1B[2J\x1B[H");
    let _ = io::stdout().flush();
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdout().flush()?;
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        anyhow::bail!("stdin closed");
    }
    Ok(input)
}

pub fn hp_bar(c: &Combatant) -> String {
    let filled = ((c.hp_percent() / 100.0) * BAR_WIDTH as f32).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let fill = match c.hp_band() {
        HpBand::Healthy => '#',
        HpBand::Wounded => '=',
        HpBand::Critical => '-',
    };
    format!(
        "[{}{}] {:>3}/{:<3}",
        fill.to_string().repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        c.hp(),
        c.max_hp()
    )
}

pub fn render_selection(roster: &Roster, player: &Combatant, opponent: &Combatant, message: &str) {
    clear_screen();
    println!("=== Pokémon Battle Arena ===");
    println!();
    for (idx, c) in roster.iter().enumerate() {
        let mut tags = Vec::new();
        if c.name == player.name {
            tags.push("you");
        }
        if c.name == opponent.name {
            tags.push("foe");
        }
        println!(
            " {idx}: {:<12} {:<9} HP {:<3} SPD {:<3} {}",
            c.name,
            c.element_type.name(),
            c.max_hp(),
            c.speed,
            if tags.is_empty() { String::new() } else { format!("<{}>", tags.join(", ")) }
        );
    }
    println!();
    println!("{message}");
    println!("Player: {}   Opponent: {}", player.name, opponent.name);
}

pub fn prompt_setup(roster_len: usize) -> Result<SetupCommand> {
    loop {
        print!("p <n> pick yours, o <n> pick foe, r random foe, s start, x reset, q quit > ");
        let input = read_line()?;
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next().and_then(|v| v.parse::<usize>().ok());
        match (cmd, arg) {
            ("p", Some(idx)) if idx < roster_len => return Ok(SetupCommand::Player(idx)),
            ("o", Some(idx)) if idx < roster_len => return Ok(SetupCommand::Opponent(idx)),
            ("r", _) => return Ok(SetupCommand::RandomOpponent),
            ("s", _) => return Ok(SetupCommand::Start),
            ("x", _) => return Ok(SetupCommand::Reset),
            ("q", _) => return Ok(SetupCommand::Quit),
            _ => println!("Invalid input, try again."),
        }
    }
}

pub fn render_battle(session: &BattleSession) {
    clear_screen();
    let player = session.player();
    let opponent = session.opponent();
    println!(
        "You: {:<12} {:<9} {}",
        player.name,
        player.element_type.name(),
        hp_bar(player)
    );
    println!(
        "Foe: {:<12} {:<9} {}",
        opponent.name,
        opponent.element_type.name(),
        hp_bar(opponent)
    );
    println!("Speed {} vs {}", player.speed, opponent.speed);
    println!();
    println!("{}", session.message());
    println!();
    println!("--- Battle log ---");
    if session.log().is_empty() {
        println!("No moves yet.");
    }
    for line in session.log().iter().take(8) {
        println!("  {line}");
    }
    println!();
}

pub fn prompt_battle(session: &BattleSession) -> Result<BattleCommand> {
    let player = session.player();
    let target = session.opponent().element_type;
    loop {
        for (idx, mv) in player.moves.iter().enumerate() {
            let hint = type_effectiveness(mv.move_type, target)
                .message()
                .map(|m| format!("  ({m})"))
                .unwrap_or_default();
            println!(" {}: {:<14} {:<9} power {:<3}{hint}", idx + 1, mv.name, mv.move_type.name(), mv.power);
        }
        print!("move 1-{}, h potion, s surrender, f full heal, x exit > ", player.moves.len());
        let input = read_line()?;
        let trimmed = input.trim();
        match trimmed {
            "h" => return Ok(BattleCommand::Potion),
            "s" => return Ok(BattleCommand::Surrender),
            "f" => return Ok(BattleCommand::FullHeal),
            "x" => return Ok(BattleCommand::Exit),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<usize>() {
            if n >= 1 && n <= player.moves.len() {
                return Ok(BattleCommand::Move(n - 1));
            }
        }
        println!("Invalid input, try again.");
    }
}

fn describe_tone(t: &Tone) -> String {
    format!("{:.0}Hz {:?} +{}ms", t.frequency_hz, t.waveform, t.delay_ms)
}

/// Prints cue lines for drained session events.
pub struct CueSink<'a> {
    pub cues: &'a CuePlayer,
}

impl FeedbackSink for CueSink<'_> {
    fn notify(&mut self, event: &FeedbackEvent) {
        if let FeedbackEvent::MoveUsed { move_type, .. } = event {
            let palette = particle_palette(*move_type);
            log::debug!("particles {}", palette.join(" "));
        }
        let tones = self.cues.tones(event);
        if tones.is_empty() {
            return;
        }
        let parts: Vec<String> = tones.iter().map(describe_tone).collect();
        println!("  ♪ {}", parts.join(" / "));
    }
}

pub fn print_step(step: &TurnStep) {
    let who = match step.actor {
        Side::Player => "You",
        Side::Opponent => "Foe",
    };
    println!("[{who}] {}", step.text);
}

pub fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

pub fn print_result(session: &BattleSession) {
    match session.winner() {
        Some(Side::Player) => println!("You won with {}!", session.player().name),
        Some(Side::Opponent) => println!("{} won. Better luck next time.", session.opponent().name),
        None => println!("{}", session.message()),
    }
}

pub fn wait_for_enter() -> Result<()> {
    print!("Press Enter to continue...");
    read_line()?;
    Ok(())
}
