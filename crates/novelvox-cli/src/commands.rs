//! Main commands enum.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List novels available on the backend
    Novels,

    /// List the chapters of a novel
    Chapters {
        /// Novel name as listed by `novelvox novels`
        novel: String,
    },

    /// List narration voices
    Voices,

    /// Narrate a chapter, continuing into the following chapters
    Read {
        /// Novel name as listed by `novelvox novels`
        novel: String,
        /// Chapter number to start from
        chapter: u32,
        /// 1-based paragraph to start at
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        start: u32,
    },
}
