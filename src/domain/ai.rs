/// Monster AI: probabilistic steering toward the player.
///
/// No pathfinding graph. Each tick the monster:
///
///   1. derives a per-direction bias from its offset to the player
///      (closer on an axis ⇒ stronger pull along it; already aligned on an
///      axis ⇒ no pull along it at all)
///   2. if it is wedged against something, nudges away from the side it
///      last touched, sliding along the orthogonal axis if that fails (or
///      holds, if that something is the player)
///   3. otherwise, with probability `move_rate`, samples a direction from
///      a `WeightedChoice` that keeps a fixed share for "repeat previous
///      heading"; a step into a wall is reverted and retried once along the
///      orthogonal axis
///   4. runs the attack gate: pressed against the player, on the side it is
///      heading, while the player is not striking it. The cooldown counter
///      then fills up, and each time it reaches the threshold it deals the
///      monster's attack points once.

use rand::Rng;

use super::entity::{Attacker, Monster, MonsterState};
use super::geom::{touching, Dir, Rect};
use super::maze::Maze;

/// Totals below this are treated as "no preference".
pub const EPSILON: f64 = 1e-9;
/// Extra slack around an axis overlap before the monster counts as aligned.
pub const ALIGN_BUFFER: i32 = 10;
/// Contact tolerance for the attack gate.
pub const ATTACK_REACH: i32 = 15;
/// Ticks before a strike during which the lunge pose shows.
pub const LUNGE_TICKS: u32 = 10;

#[derive(Clone, Copy, Debug)]
pub struct AiTuning {
    pub move_rate: f64,
    pub max_range: f64,
    pub speed: i32,
    /// Probability mass reserved for repeating the previous heading.
    pub persistence: f64,
    pub attack_cooldown: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        AiTuning {
            move_rate: 0.75,
            max_range: 8000.0,
            speed: 5,
            persistence: 2.0 / 3.0,
            attack_cooldown: 50,
        }
    }
}

// ── Bias ──

/// Raw, unnormalised pull in each direction.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Bias {
    pub left: f64,
    pub right: f64,
    pub up: f64,
    pub down: f64,
}

impl Bias {
    pub fn weight(&self, d: Dir) -> f64 {
        match d {
            Dir::Left => self.left,
            Dir::Right => self.right,
            Dir::Up => self.up,
            Dir::Down => self.down,
        }
    }

    pub fn total(&self) -> f64 {
        self.left + self.right + self.up + self.down
    }
}

/// Pull along one axis as `(toward negative, toward positive)`.
///
/// `offset` is player centre minus monster near edge; `half` is half the
/// player's extent and `span` the monster's extent on this axis.
fn axis_pull(offset: i32, half: i32, span: i32, max_range: f64) -> (f64, f64) {
    if -(half + ALIGN_BUFFER) < offset && offset < half + span + ALIGN_BUFFER {
        return (0.0, 0.0);
    }
    let p = ((max_range - offset.abs() as f64) / max_range).clamp(0.0, 1.0);
    if offset < 0 { (p, 1.0 - p) } else { (1.0 - p, p) }
}

pub fn bias_toward(monster: &Rect, player: &Rect, max_range: f64) -> Bias {
    let pc = player.center();
    let (left, right) = axis_pull(pc.x - monster.x, player.w / 2, monster.w, max_range);
    let (up, down) = axis_pull(pc.y - monster.y, player.h / 2, monster.h, max_range);
    Bias { left, right, up, down }
}

// ── Weighted choice ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    Step(Dir),
    /// Keep the previous heading.
    Repeat,
    /// No usable preference at all.
    Hold,
}

/// Normalised distribution over the four directions plus a persistence
/// bucket. The directions share `1 − persistence`; the bucket holds the rest.
#[derive(Clone, Copy, Debug)]
pub struct WeightedChoice {
    probs: [f64; 4],
    degenerate: bool,
}

impl WeightedChoice {
    pub fn new(bias: &Bias, persistence: f64) -> Self {
        let total = bias.total();
        if !(total > EPSILON) {
            return WeightedChoice { probs: [0.0; 4], degenerate: true };
        }
        let share = (1.0 - persistence).clamp(0.0, 1.0);
        let mut probs = [0.0; 4];
        for (p, d) in probs.iter_mut().zip(Dir::ALL) {
            *p = bias.weight(d).max(0.0) / total * share;
        }
        WeightedChoice { probs, degenerate: false }
    }

    pub fn probability(&self, d: Dir) -> f64 {
        Dir::ALL.iter().position(|x| *x == d).map_or(0.0, |i| self.probs[i])
    }

    /// Mass left for "repeat previous heading".
    pub fn persistence(&self) -> f64 {
        if self.degenerate { 0.0 } else { 1.0 - self.probs.iter().sum::<f64>() }
    }

    /// Resolve a uniform roll in `[0, 1)`.
    pub fn pick(&self, roll: f64) -> Choice {
        if self.degenerate {
            return Choice::Hold;
        }
        let mut acc = 0.0;
        for (p, d) in self.probs.iter().zip(Dir::ALL) {
            acc += p;
            if roll < acc {
                return Choice::Step(d);
            }
        }
        Choice::Repeat
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        self.pick(rng.random::<f64>())
    }
}

/// Direction to try after `failed` hit a wall: the orthogonal axis, split
/// by the bias on that axis (even odds if it has none).
pub fn orthogonal(bias: &Bias, failed: Dir, roll: f64) -> Dir {
    let (neg, pos, a, b) = if failed.is_horizontal() {
        (Dir::Up, Dir::Down, bias.up, bias.down)
    } else {
        (Dir::Left, Dir::Right, bias.left, bias.right)
    };
    let sum = a + b;
    let p_neg = if sum > EPSILON { a / sum } else { 0.5 };
    if roll < p_neg { neg } else { pos }
}

// ── Movement ──

/// What the monster sees around it this tick.
pub struct Surroundings<'a> {
    pub maze: &'a Maze,
    pub player: &'a Rect,
    /// Everything with walk_over = false except the monster itself and the player.
    pub blockers: &'a [Rect],
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Moved,
    /// Hit maze geometry; position unchanged.
    HitWall,
    /// Hit an entity or the maze edge; position unchanged.
    Blocked,
}

impl<'a> Surroundings<'a> {
    fn wedged(&self, r: &Rect) -> bool {
        self.maze.collides_monster(r) || self.blockers.iter().any(|b| b.overlaps(r))
    }

    fn entity_blocked(&self, r: &Rect) -> bool {
        !self.maze.in_bounds(r) || r.overlaps(self.player) || self.blockers.iter().any(|b| b.overlaps(r))
    }
}

/// Candidate-then-validate step. On anything but `Moved` the rect is untouched.
pub fn try_step(monster: &mut Monster, dir: Dir, env: &Surroundings, speed: i32) -> StepOutcome {
    monster.heading = Some(dir);
    let (dx, dy) = dir.delta();
    let cand = monster.rect.translated(dx * speed, dy * speed);
    if env.maze.collides_monster(&cand) {
        monster.last_contact = Some(dir);
        return StepOutcome::HitWall;
    }
    if env.entity_blocked(&cand) {
        return StepOutcome::Blocked;
    }
    monster.rect = cand;
    StepOutcome::Moved
}

/// Move out of a wedged spot. Walls are not checked, since the current spot
/// already overlaps something; only the maze edge and the player stop it.
fn nudge(monster: &mut Monster, dir: Dir, env: &Surroundings, speed: i32) -> bool {
    let (dx, dy) = dir.delta();
    let cand = monster.rect.translated(dx * speed, dy * speed);
    if !env.maze.in_bounds(&cand) || cand.overlaps(env.player) {
        return false;
    }
    monster.rect = cand;
    monster.heading = Some(dir);
    true
}

/// A step that falls back to the orthogonal axis once if it hits a wall.
fn step_with_recovery<R: Rng + ?Sized>(
    monster: &mut Monster,
    dir: Dir,
    bias: &Bias,
    env: &Surroundings,
    speed: i32,
    rng: &mut R,
) -> bool {
    match try_step(monster, dir, env, speed) {
        StepOutcome::Moved => true,
        StepOutcome::Blocked => false,
        StepOutcome::HitWall => {
            let alt = orthogonal(bias, dir, rng.random::<f64>());
            try_step(monster, alt, env, speed) == StepOutcome::Moved
        }
    }
}

/// Steering half of the tick. Returns true if the monster moved.
pub fn steer<R: Rng + ?Sized>(monster: &mut Monster, env: &Surroundings, tuning: &AiTuning, rng: &mut R) -> bool {
    let bias = bias_toward(&monster.rect, env.player, tuning.max_range);

    if env.wedged(&monster.rect) {
        if touching(&monster.rect, env.player, 0).touching {
            return false;
        }
        let away = match monster.last_contact {
            Some(side) => side.opposite(),
            None => orthogonal(&bias, monster.heading.unwrap_or(Dir::Left), rng.random::<f64>()),
        };
        if nudge(monster, away, env, tuning.speed) {
            return true;
        }
        let alt = orthogonal(&bias, away, rng.random::<f64>());
        return nudge(monster, alt, env, tuning.speed);
    }

    if rng.random::<f64>() >= tuning.move_rate {
        return false;
    }

    match WeightedChoice::new(&bias, tuning.persistence).sample(rng) {
        Choice::Step(d) => step_with_recovery(monster, d, &bias, env, tuning.speed, rng),
        Choice::Repeat => match monster.heading {
            Some(d) => step_with_recovery(monster, d, &bias, env, tuning.speed, rng),
            None => false,
        },
        Choice::Hold => false,
    }
}

// ── Attack ──

/// Attack gate. Returns the damage dealt this tick, if any. Marks the
/// monster `Attacking` while it is engaged.
pub fn attack(monster: &mut Monster, player: &Rect, player_striking: bool, threshold: u32) -> Option<i32> {
    let contact = touching(&monster.rect, player, ATTACK_REACH);
    if contact.touching && contact.side.is_some() {
        monster.last_contact = contact.side;
    }

    let engaged = contact.touching
        && contact.side.is_some()
        && contact.side == monster.heading
        && !player_striking;
    if !engaged {
        monster.lunging = false;
        return None;
    }

    monster.state = MonsterState::Attacking;
    monster.cooldown += 1;
    monster.lunging = monster.cooldown + LUNGE_TICKS >= threshold;
    if monster.cooldown >= threshold {
        monster.cooldown = 0;
        Some(monster.attack_points())
    } else {
        None
    }
}

/// Full monster tick: steer, then the attack gate. Updates `monster.state`.
pub fn think<R: Rng + ?Sized>(
    monster: &mut Monster,
    env: &Surroundings,
    tuning: &AiTuning,
    player_striking: bool,
    rng: &mut R,
) -> Option<i32> {
    let moved = steer(monster, env, tuning, rng);
    monster.state = if moved { MonsterState::Moving } else { MonsterState::Idle };
    attack(monster, env.player, player_striking, tuning.attack_cooldown)
}
