use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Reveal nutrition or sustainability facts for a product", long_about = None)]
pub struct Cli {
    /// Override OPENROUTER_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a product description and/or photos once
    Analyze {
        /// What the product is, e.g. "500 ml PET water bottle"
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Image of the product (repeatable)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the web front-end
    #[cfg(feature = "web-server")]
    Serve {
        /// Overrides ECOREVEAL_BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "ecoreveal",
            "analyze",
            "--prompt",
            "soda can",
            "--image",
            "a.jpg",
            "-i",
            "b.png",
            "--format",
            "html",
            "--model",
            "openai/gpt-4o-mini",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("openai/gpt-4o-mini"));
        match cli.command {
            Command::Analyze { prompt, images, format, output } => {
                assert_eq!(prompt, "soda can");
                assert_eq!(images, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
                assert_eq!(format, OutputFormat::Html);
                assert!(output.is_none());
            }
            #[allow(unreachable_patterns)]
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["ecoreveal", "analyze"]).unwrap();
        let Command::Analyze { prompt, images, format, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert!(prompt.is_empty());
        assert!(images.is_empty());
        assert_eq!(format, OutputFormat::Text);
    }
}
