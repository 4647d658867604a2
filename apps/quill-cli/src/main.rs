//! # Quill CLI
//!
//! Writes and reads a Quill blog through the server's HTTP API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use quill_core::domain::{
    AuthorRef, ImageKind, ImageUpload, NewComment, NewPost, PostPatch, Session, content_type_for,
};
use quill_core::pagination::PageRequest;
use quill_core::ports::AuthGateway;
use quill_core::store::{BlogController, SliceStatus};
use quill_core::validation::{LoginForm, RegistrationForm};
use quill_infra::HttpGateway;

mod render;
mod session;

use session::SessionFile;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "quill", version, about = "Write and read a Quill blog")]
struct Cli {
    /// Server base URL. Defaults to `QUILL_API_URL`, then http://127.0.0.1:8080.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in account.
    Whoami,
    /// List posts, newest first. Your own unless `--author` is given.
    List {
        #[arg(long)]
        author: Option<Uuid>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show a post and its comments, by id or as `author/slug`.
    Show { target: String },
    /// Publish a new post.
    New {
        #[arg(long)]
        title: String,
        /// HTML body.
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read the HTML body from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Cover image to upload.
        #[arg(long)]
        cover: Option<PathBuf>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Change an existing post.
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "remove_cover")]
        cover: Option<PathBuf>,
        #[arg(long)]
        remove_cover: bool,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete a post and its comments.
    Delete { id: Uuid },
    /// Comment on a post. No login needed.
    Comment {
        post_id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        content: String,
        /// Image to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Upload an image and print its public URL.
    Upload {
        file: PathBuf,
        /// cover, inline or comment.
        #[arg(long, default_value = "inline")]
        kind: ImageKind,
    },
}

struct App {
    gateway: Arc<HttpGateway>,
    controller: BlogController,
    sessions: SessionFile,
}

impl App {
    fn new(api_url: &str) -> Result<Self> {
        let gateway = Arc::new(HttpGateway::new(api_url)?);
        Ok(Self {
            controller: BlogController::new(gateway.clone()),
            gateway,
            sessions: SessionFile::from_env()?,
        })
    }

    async fn image(&self, session: Option<&Session>, kind: ImageKind, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;

        let upload = ImageUpload {
            kind,
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        };
        Ok(self.controller.upload_image(session, upload).await?)
    }

    async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Register {
                email,
                password,
                confirm_password,
            } => {
                let session = self
                    .gateway
                    .register(RegistrationForm {
                        email,
                        password,
                        confirm_password,
                    })
                    .await?;
                self.sessions.save(&session)?;
                println!("Welcome, {}! You are logged in.", session.username());
            }
            Command::Login { email, password } => {
                let session = self.gateway.login(LoginForm { email, password }).await?;
                self.sessions.save(&session)?;
                println!("Logged in as {}.", session.email);
            }
            Command::Logout => {
                if self.sessions.clear()? {
                    println!("Logged out.");
                } else {
                    println!("No session at {}.", self.sessions.path().display());
                }
            }
            Command::Whoami => {
                let session = self.sessions.require()?;
                let user = self.gateway.current_user(&session).await?;
                println!("{} <{}>\nid: {}", user.username, user.email, user.id);
            }
            Command::List {
                author,
                page,
                page_size,
            } => {
                let author_id = match author {
                    Some(id) => id,
                    None => self.sessions.require()?.user_id,
                };
                let request = PageRequest::from_query(Some(page), page_size)?;
                self.controller.load_posts(author_id, request).await;

                let posts = &self.controller.store().posts;
                if let Some(error) = posts.error() {
                    bail!("Could not load posts: {error}");
                }
                println!("{}", render::post_list(posts.data()));
            }
            Command::Show { target } => self.show(&target).await?,
            Command::New {
                title,
                content,
                file,
                cover,
                slug,
            } => {
                let session = self.sessions.require()?;
                let content = body(content, file).await?.unwrap_or_default();
                let image_url = match cover {
                    Some(path) => Some(self.image(Some(&session), ImageKind::Cover, &path).await?),
                    None => None,
                };
                let post = self
                    .controller
                    .create_post(
                        &session,
                        NewPost {
                            title,
                            content,
                            image_url,
                            slug,
                        },
                    )
                    .await?;
                println!("Published {} at /blog/{}/{}", post.id, session.username(), post.slug);
            }
            Command::Edit {
                id,
                title,
                content,
                file,
                cover,
                remove_cover,
                slug,
            } => {
                let session = self.sessions.require()?;
                let image_url = match (cover, remove_cover) {
                    (Some(path), _) => {
                        Some(self.image(Some(&session), ImageKind::Cover, &path).await?)
                    }
                    (None, true) => Some(String::new()),
                    (None, false) => None,
                };
                let patch = PostPatch {
                    title,
                    content: body(content, file).await?,
                    image_url,
                    slug,
                };
                if patch.is_empty() {
                    bail!("Nothing to change. Pass at least one of --title, --content, --file, --cover, --remove-cover or --slug.");
                }
                let post = self.controller.update_post(&session, id, patch).await?;
                println!("Updated \"{}\".", post.title);
            }
            Command::Delete { id } => {
                let session = self.sessions.require()?;
                self.controller.delete_post(&session, id).await?;
                println!("Deleted {id}.");
            }
            Command::Comment {
                post_id,
                name,
                email,
                content,
                image,
            } => {
                let session = self.sessions.load()?;
                let image_url = match image {
                    Some(path) => {
                        Some(self.image(session.as_ref(), ImageKind::Comment, &path).await?)
                    }
                    None => None,
                };
                let comment = self
                    .controller
                    .create_comment(
                        session.as_ref(),
                        NewComment {
                            post_id,
                            author_name: name,
                            author_email: email,
                            content,
                            image_url,
                        },
                    )
                    .await?;
                println!("{}", render::comment_block(&comment));
            }
            Command::Upload { file, kind } => {
                let session = self.sessions.load()?;
                let url = self.image(session.as_ref(), kind, &file).await?;
                println!("{url}");
            }
        }
        Ok(())
    }

    async fn show(&mut self, target: &str) -> Result<()> {
        match Uuid::parse_str(target) {
            Ok(id) => self.controller.open_post(id).await,
            Err(_) => {
                let (author, slug) = target
                    .split_once('/')
                    .ok_or_else(|| anyhow!("Expected a post id or author/slug, got '{target}'"))?;
                self.controller
                    .load_post_by_slug(&AuthorRef::parse(author), slug)
                    .await;
                let id = self.controller.store().current_post.data().as_ref().map(|p| p.id);
                if let Some(id) = id {
                    self.controller.load_comments(id).await;
                }
            }
        }

        let store = self.controller.store();
        if let Some(error) = store.current_post.error() {
            bail!("Could not load the post: {error}");
        }
        let Some(post) = store.current_post.data() else {
            bail!("Post not found: {target}");
        };
        println!("{}", render::post_detail(post));

        let comments = &store.comments;
        println!();
        match comments.status() {
            SliceStatus::Failed => println!(
                "Comments unavailable: {}",
                comments.error().unwrap_or("unknown error")
            ),
            _ if comments.data().items.is_empty() => println!("No comments yet."),
            _ => {
                println!("Comments ({})", comments.data().items.len());
                for comment in &comments.data().items {
                    println!("{}", render::comment_block(comment));
                }
            }
        }
        Ok(())
    }
}

async fn body(content: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (content, file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .map(Some)
            .with_context(|| format!("reading {}", path.display())),
        (None, None) => Ok(None),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let api_url = cli
        .api_url
        .or_else(|| std::env::var("QUILL_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    App::new(&api_url)?.run(cli.command).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_kind_parses() {
        let cli = Cli::parse_from(["quill", "upload", "pic.png", "--kind", "cover"]);
        assert!(matches!(
            cli.command,
            Command::Upload {
                kind: ImageKind::Cover,
                ..
            }
        ));
    }

    #[test]
    fn test_content_and_file_conflict() {
        let parsed = Cli::try_parse_from([
            "quill", "new", "--title", "T", "--content", "<p>x</p>", "--file", "body.html",
        ]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_body_prefers_inline_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.html");
        std::fs::write(&path, "<p>from file</p>").unwrap();

        assert_eq!(
            body(None, Some(path.clone())).await.unwrap().as_deref(),
            Some("<p>from file</p>")
        );
        assert_eq!(
            body(Some("inline".into()), None).await.unwrap().as_deref(),
            Some("inline")
        );
        assert_eq!(body(None, None).await.unwrap(), None);
    }
}
