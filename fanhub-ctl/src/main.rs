use anyhow::Context;
use fanhub_client::{
    api::{Api, CommentId, Credentials, NewUser, StoryId, UserId},
    mention::{self, Segment},
    HttpApi, Outcome, Recommendations, ReplyList, Route, ThreadTree, MAX_REPLY_DEPTH,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "FANHUB_HOST")]
    host: String,

    /// Log in with this email before running the command
    #[structopt(long, env = "FANHUB_EMAIL")]
    email: Option<String>,

    #[structopt(long, env = "FANHUB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Create an account
    Signup {
        username: String,
        email: String,
        password: String,
    },

    /// Print every reply under a comment, as a tree
    Thread { comment: String },

    /// Reply to a comment
    Reply { comment: String, content: String },

    /// Comment on a story
    Comment { story: String, content: String },

    /// Print the recommendation lists of a user
    Lists { user: String },
}

/// Turns a redirection to the error page into an error
fn check(outcome: Option<Route>) -> anyhow::Result<()> {
    match outcome {
        Some(Route::Error { message }) => Err(anyhow::anyhow!(message)),
        _ => Ok(()),
    }
}

async fn load_thread(api: &HttpApi, root: &CommentId) -> anyhow::Result<ThreadTree> {
    let mut list = ReplyList::new(root.clone());
    check(list.load_subtree(api).await)?;
    if let Some(err) = list.error() {
        anyhow::bail!("loading replies under {root}: {err}");
    }
    tracing::debug!(%root, num = list.len(), "loaded thread");
    Ok(ThreadTree::build(root, list.replies().cloned()))
}

fn print_thread(tree: &ThreadTree) {
    for row in tree.rows(MAX_REPLY_DEPTH) {
        let r = row.reply;
        let text = mention::render(&r.content, &r.mentions)
            .iter()
            .map(|s| match s {
                Segment::Link { user, text } => format!("{text}<{}>", user.id),
                other => other.text().to_string(),
            })
            .collect::<String>();
        println!(
            "{}{} ({} likes): {}",
            "  ".repeat(row.depth),
            r.author.username,
            r.likes,
            text
        );
    }
    if !tree.orphans.is_empty() {
        println!("{} replies could not be attached", tree.orphans.len());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let api = HttpApi::new(&opt.host)?;

    if let (Some(email), Some(password)) = (opt.email, opt.password) {
        let user = api
            .login(&Credentials { email, password })
            .await
            .context("logging in")?;
        tracing::info!(user = %user.id, "logged in");
    }

    match opt.cmd {
        Command::Signup {
            username,
            email,
            password,
        } => {
            let user = NewUser {
                username,
                email,
                password: password.clone(),
            };
            let outcome = fanhub_client::forms::signup(&api, &user, &password).await;
            match outcome {
                Outcome {
                    navigate: Some(Route::Login),
                    ..
                } => println!("account {} created", user.username),
                Outcome {
                    inline_error: Some(e),
                    ..
                } => anyhow::bail!(e),
                Outcome {
                    navigate: Some(Route::Error { message }),
                    ..
                } => anyhow::bail!(message),
                other => tracing::warn!(?other, "unexpected signup outcome"),
            }
        }
        Command::Thread { comment } => {
            let tree = load_thread(&api, &CommentId(comment)).await?;
            print_thread(&tree);
        }
        Command::Reply { comment, content } => {
            let mut list = ReplyList::new(CommentId(comment));
            check(list.post(&api, &content).await)?;
            if let Some(err) = list.error() {
                anyhow::bail!(err.to_string());
            }
            if let Some(r) = list.replies().next() {
                println!("posted reply {}", r.id);
            };
        }
        Command::Comment { story, content } => {
            let mut list = ReplyList::new(StoryId(story));
            check(list.post(&api, &content).await)?;
            if let Some(err) = list.error() {
                anyhow::bail!(err.to_string());
            }
            if let Some(c) = list.replies().next() {
                println!("posted comment {}", c.id);
            };
        }
        Command::Lists { user } => {
            let mut recs = Recommendations::new();
            if !recs.fetch_all(&api, &UserId(user)).await {
                if let Some(err) = recs.error() {
                    return Err(err.clone()).context("fetching recommendation lists");
                }
            }
            for l in recs.lists() {
                let state = match l.published {
                    true => "published",
                    false => "draft",
                };
                println!(
                    "{} {} [{state}] {} stories, {} likes",
                    l.id,
                    l.name,
                    l.stories.len(),
                    l.likes
                );
            }
        }
    }

    Ok(())
}
