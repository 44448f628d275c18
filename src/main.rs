use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use fbpopup::config::Config;
use fbpopup::display::Display;
use fbpopup::geometry::{Point, Rect};
use fbpopup::screen_overlay::InactivityWarning;
use fbpopup::surface::Framebuffer;

/// 在一块内存帧缓冲上演示不活动倒计时弹出层
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 打开 debug 日志，可以用 RUST_LOG 细调
    #[arg(long)]
    debug: bool,

    /// 覆盖配置里的倒计时秒数
    #[arg(long)]
    warn_secs: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(secs) = args.warn_secs {
        config.warning.warn_secs = secs;
    }
    config.debug |= args.debug;
    config.validate()?;

    fbpopup::logging::init(config.debug);

    // 叠加层状态不跨线程
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    let fb_config = &config.framebuffer;
    let warning = &config.warning;
    let framebuffer = Framebuffer::new(fb_config.width, fb_config.height, fb_config.format)
        .context("allocate framebuffer")?;

    let mut display = Display::new();
    let id = display.add_screen(framebuffer, true);
    let updates = Rc::clone(display.updates());
    let screen = display
        .screen_mut(id)
        .context("screen disappeared right after being added")?;

    let at = Point::new(
        (fb_config.width as i32 - i32::from(warning.width)) / 2,
        (fb_config.height as i32 - i32::from(warning.height)) / 2,
    );
    let total = warning.duration();
    info!(?total, x = at.x, y = at.y, "counting down");

    let start = Instant::now();
    let mut ticker = tokio::time::interval(warning.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut app_drew = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut ctrl_c => {
                result.context("listen for ctrl-c")?;
                info!("interrupted");
                break;
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= total {
            info!("inactivity timeout reached");
            break;
        }
        let left = 1.0 - elapsed.as_secs_f64() / total.as_secs_f64();
        let content = InactivityWarning::new(left).content(warning.width, warning.height);
        if !screen.set_overlay(Some(Rc::new(content)), at) {
            debug!("warning not shown this tick");
        }

        if !app_drew && left < 0.5 {
            // 应用画到了提示框的角上
            screen.fill_rect(Rect::new(at.x - 4, at.y - 4, 32, 32), 0xff20_4080);
            app_drew = true;
            info!(phase = ?screen.overlay_phase(), "application drew under the warning");
        }

        match updates.take_update(id) {
            Some(region) => debug!(
                rects = region.rects().len(),
                bounds = ?region.bounds(),
                "sending update"
            ),
            None => debug!("nothing to send"),
        }
    }

    screen.set_overlay(None, at);
    if let Some(region) = updates.take_update(id) {
        debug!(bounds = ?region.bounds(), "sending final update");
    }
    if let Some(framebuffer) = display.close_screen(id) {
        info!(
            width = framebuffer.width(),
            height = framebuffer.height(),
            deferred = updates.deferred_sends(),
            "done"
        );
    }
    Ok(())
}
