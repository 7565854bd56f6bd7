//! Read command handler: the interactive terminal player.
//!
//! Narrates a chapter through the playback engine while reading reader
//! commands from stdin. When a chapter completes, the next chapter in the
//! novel's list is fetched and opened, until the list runs out.

use std::ops::ControlFlow;
use std::sync::Arc;

use novelvox_core::{ChapterInfo, Paragraphs};
use novelvox_player::{
    PlayerError, PlayerEvent, PlayerHandle, RodioSoundFactory, SoundFactory,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::keys::{HELP, ReaderCommand, parse_reader_command};

/// Position in a novel's chapter list.
#[derive(Debug)]
struct ChapterCursor {
    chapters: Vec<ChapterInfo>,
    position: usize,
}

impl ChapterCursor {
    fn new(mut chapters: Vec<ChapterInfo>, number: u32, novel: &str) -> Result<Self, CliError> {
        chapters.sort_by_key(|c| c.number);
        let position = chapters
            .iter()
            .position(|c| c.number == number)
            .ok_or_else(|| CliError::NotFound(format!("chapter {number} of '{novel}'")))?;
        Ok(Self { chapters, position })
    }

    fn current(&self) -> &ChapterInfo {
        &self.chapters[self.position]
    }

    /// Move to the following chapter, if there is one.
    fn advance(&mut self) -> Option<&ChapterInfo> {
        if self.position + 1 >= self.chapters.len() {
            return None;
        }
        self.position += 1;
        Some(self.current())
    }
}

struct Reader<'a> {
    ctx: &'a CliContext,
    novel: &'a str,
    player: PlayerHandle,
    cursor: ChapterCursor,
    paragraphs: Paragraphs,
}

impl Reader<'_> {
    /// Fetch the cursor's chapter and hand it to the player.
    async fn open_current(&mut self, start: usize, first: bool) -> Result<(), CliError> {
        let chapter = self.cursor.current().clone();
        let paragraphs = self
            .ctx
            .source
            .chapter_content(self.novel, chapter.number)
            .await?;
        if paragraphs.is_empty() {
            return Err(CliError::NotFound(format!(
                "text of chapter {} of '{}'",
                chapter.number, self.novel
            )));
        }

        println!("\n== {} ==\n", chapter.title);
        if first {
            self.player
                .open_with(
                    paragraphs.clone(),
                    start,
                    self.ctx.settings.effective_voice(),
                    self.ctx.settings.effective_speed(),
                )
                .await?;
        } else {
            self.player.open(paragraphs.clone(), start).await?;
        }
        self.paragraphs = paragraphs;
        Ok(())
    }

    async fn on_line(&mut self, line: &str) -> ControlFlow<()> {
        let command = match parse_reader_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return ControlFlow::Continue(()),
            Err(e) => {
                println!("  {e}");
                return ControlFlow::Continue(());
            }
        };

        let result = match command {
            ReaderCommand::Quit => return ControlFlow::Break(()),
            ReaderCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            ReaderCommand::Status => {
                self.print_status();
                Ok(())
            }
            ReaderCommand::TogglePlay => {
                if self.player.snapshot().is_playing {
                    self.player.pause().await
                } else {
                    self.player.play().await
                }
            }
            ReaderCommand::Next => self.player.next().await,
            ReaderCommand::Restart => self.player.restart().await,
            ReaderCommand::Retry => self.player.retry().await,
            ReaderCommand::Voice(voice) => {
                let result = self.player.set_voice(voice).await;
                if result.is_ok() {
                    println!("  voice: {}", voice.display_name());
                }
                result
            }
            ReaderCommand::Speed(speed) => {
                let result = self.player.set_speed(speed).await;
                if result.is_ok() {
                    println!("  speed: {speed}");
                }
                result
            }
        };

        match result {
            Err(PlayerError::Closed) => ControlFlow::Break(()),
            Err(e) => {
                println!("  {e}");
                ControlFlow::Continue(())
            }
            Ok(()) => ControlFlow::Continue(()),
        }
    }

    async fn on_event(&mut self, event: PlayerEvent) -> Result<ControlFlow<()>, CliError> {
        match event {
            PlayerEvent::ParagraphStarted { index } => {
                if let Some(text) = self.paragraphs.get(index) {
                    println!("[{}/{}] {text}\n", index + 1, self.paragraphs.len());
                }
            }
            PlayerEvent::Error(e) => {
                println!("  ! {e} (type 'retry', or 'n' to skip)");
            }
            PlayerEvent::StateChanged(state) => {
                tracing::debug!(%state, "Player state changed");
            }
            PlayerEvent::ChapterComplete => {
                if self.cursor.advance().is_none() {
                    println!("\nEnd of '{}'.", self.novel);
                    return Ok(ControlFlow::Break(()));
                }
                self.open_current(0, false).await?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn print_status(&self) {
        let snapshot = self.player.snapshot();
        let chapter = self.cursor.current();
        println!(
            "  chapter {} ({}), {} of {} paragraphs, {}, {}",
            chapter.number,
            chapter.title,
            snapshot.state,
            snapshot.paragraph_count,
            snapshot.voice.display_name(),
            snapshot.speed,
        );
    }
}

/// Narrate `novel` starting at `chapter`, paragraph `start` (0-based).
pub async fn execute(
    ctx: &CliContext,
    novel: &str,
    chapter: u32,
    start: usize,
) -> Result<(), CliError> {
    let chapters = ctx.source.list_chapters(novel).await?;
    let cursor = ChapterCursor::new(chapters, chapter, novel)?;

    let sounds: Arc<dyn SoundFactory> = Arc::new(RodioSoundFactory::new()?);
    let (player, mut events) =
        PlayerHandle::spawn(ctx.player_config(), Arc::clone(&ctx.speech), sounds);

    let mut reader = Reader {
        ctx,
        novel,
        player,
        cursor,
        paragraphs: Paragraphs::from_raw(Vec::new()),
    };

    let result = run(&mut reader, &mut events, start).await;
    match reader.player.close().await {
        Ok(()) | Err(PlayerError::Closed) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to close player"),
    }
    result
}

async fn run(
    reader: &mut Reader<'_>,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<PlayerEvent>,
    start: usize,
) -> Result<(), CliError> {
    reader.open_current(start, true).await?;
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let flow = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => reader.on_line(&line).await,
                // stdin closed
                None => ControlFlow::Break(()),
            },
            event = events.recv() => match event {
                Some(event) => reader.on_event(event).await?,
                None => ControlFlow::Break(()),
            },
        };
        if flow.is_break() {
            return Ok(());
        }
    }
}
