use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use clap::Parser;
use tickbook::sim::{MarketSim, SimConfig};
use tickbook::{BookLevel, OrderBook};

const BAR_WIDTH: u64 = 40;

#[derive(Parser)]
#[command(name = "sim")]
#[command(about = "Random market flow against a single book, rendered as a depth ladder")]
struct Args {
    /// Steps to run; 0 runs until interrupted.
    #[arg(long, default_value_t = 2_000)]
    steps: u64,
    /// Depth levels rendered per side.
    #[arg(long, default_value_t = 10)]
    levels: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 10_000)]
    center: i64,
    #[arg(long, default_value_t = 50)]
    half_spread: i64,
    /// Milliseconds slept between steps.
    #[arg(long, default_value_t = 20)]
    delay_ms: u64,
    /// Redraw the ladder every N steps.
    #[arg(long, default_value_t = 25)]
    refresh: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = SimConfig {
        center_price: args.center,
        half_spread: args.half_spread,
        ..SimConfig::default()
    };

    let mut book = OrderBook::default();
    let mut sim = MarketSim::new(config, args.seed);

    let mut step = 0u64;
    loop {
        sim.step(&mut book);
        step += 1;
        if step % args.refresh == 0 {
            render(&book, args.levels);
        }
        if args.steps > 0 && step >= args.steps {
            break;
        }
        thread::sleep(Duration::from_millis(args.delay_ms));
    }
    render(&book, args.levels);
}

fn render(book: &OrderBook, levels: usize) {
    let asks = book.ask_depth(levels);
    let bids = book.bid_depth(levels);
    let max_volume = asks
        .iter()
        .chain(bids.iter())
        .map(|level| level.volume)
        .max()
        .unwrap_or(0);

    let mut frame = String::new();
    // Clear and home so the ladder redraws in place.
    frame.push_str("\x1b[2J\x1b[H");

    if max_volume == 0 {
        frame.push_str("book is empty\n");
        print_frame(&frame);
        return;
    }

    frame.push_str(&format!("{:=<64}\n", ""));
    // Asks worst-to-best so the touch meets the spread line.
    for level in asks.iter().rev() {
        frame.push_str(&bar(level, max_volume));
    }
    if let (Some(bid), Some(ask), Some(spread)) =
        (book.best_bid(), book.best_ask(), book.spread())
    {
        frame.push_str(&format!("{:-<64}\n", ""));
        frame.push_str(&format!("spread {:>5} | mid {:>7}\n", spread, (bid + ask) / 2));
        frame.push_str(&format!("{:-<64}\n", ""));
    }
    for level in &bids {
        frame.push_str(&bar(level, max_volume));
    }
    frame.push_str(&format!("{:=<64}\n", ""));
    frame.push_str(&format!("resting orders: {}\n", book.order_count()));

    print_frame(&frame);
}

fn bar(level: &BookLevel, max_volume: u64) -> String {
    let len = (level.volume * BAR_WIDTH / max_volume) as usize;
    format!("{:>7} | {:>6} | {}\n", level.price, level.volume, "#".repeat(len))
}

fn print_frame(frame: &str) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(frame.as_bytes());
    let _ = stdout.flush();
}
