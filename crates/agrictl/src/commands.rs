//! Command implementations

use crate::cli::Cli;
use crate::client::AgridClient;
use crate::output;
use agri_shared::rpc::{ChatRequest, ReconcileResponse};
use agri_shared::reconcile::fallback_label;
use agri_shared::{Catalog, DiseaseView, KnowledgeBase, Language, Reconciler, Resolver};
use anyhow::{anyhow, bail, Context as _, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Global options shared by every command
pub struct Context {
    pub json: bool,
    pub daemon: String,
    pub knowledge: Option<PathBuf>,
}

impl Context {
    pub fn knowledge_base(&self) -> Result<Arc<KnowledgeBase>> {
        load_knowledge(self.knowledge.as_deref())
    }
}

/// Built-in knowledge, or the given JSON file. Invalid data is an error.
pub fn load_knowledge(path: Option<&Path>) -> Result<Arc<KnowledgeBase>> {
    let kb = match path {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("loading knowledge base {}", path.display()))?,
        None => KnowledgeBase::builtin()?,
    };
    Ok(Arc::new(kb))
}

/// Parse `--lang`; absent means the primary language.
pub fn parse_lang(lang: Option<&str>) -> Result<Language> {
    match lang {
        Some(code) => code.parse::<Language>().map_err(|e| anyhow!(e)),
        None => Ok(Language::default()),
    }
}

pub async fn chat(
    ctx: &Context,
    message: Vec<String>,
    lang: Option<String>,
    remote: bool,
    session: Option<String>,
) -> Result<()> {
    let lang = parse_lang(lang.as_deref())?;
    let messages: Vec<String> = if message.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("reading messages from stdin")?
    } else {
        vec![message.join(" ")]
    };

    if remote {
        let client = AgridClient::new(&ctx.daemon)?;
        let session = session.unwrap_or_else(|| format!("cli-{}", uuid::Uuid::new_v4()));
        for text in messages {
            let mut request = ChatRequest::new(text);
            request.language = Some(lang.code().to_string());
            request.session_id = Some(session.clone());
            let reply = client.chat(&request).await?;
            if ctx.json {
                output::print_json(&reply)?;
            } else {
                println!("{}\n", reply.response);
            }
        }
        return Ok(());
    }

    let kb = ctx.knowledge_base()?;
    let resolver = Resolver::with_builtin_rules(kb, true);
    for text in messages {
        let resolution = resolver.resolve(&text, lang);
        if ctx.json {
            output::print_json(&resolution)?;
        } else {
            println!("{}\n", resolution.text);
        }
    }
    Ok(())
}

pub fn diseases(ctx: &Context, crop: Option<String>, lang: Option<String>) -> Result<()> {
    let lang = parse_lang(lang.as_deref())?;
    let catalog = Catalog::new(ctx.knowledge_base()?);
    let views: Vec<DiseaseView> = match crop.as_deref() {
        Some(crop) => catalog
            .filter_by_crop(crop)
            .into_iter()
            .map(|e| catalog.view(e, lang))
            .collect(),
        None => catalog
            .all_entries()
            .iter()
            .map(|e| catalog.view(e, lang))
            .collect(),
    };
    if ctx.json {
        return output::print_json(&views);
    }
    output::print_disease_list(&views);
    Ok(())
}

pub fn show(ctx: &Context, id: &str, lang: Option<String>) -> Result<()> {
    let lang = parse_lang(lang.as_deref())?;
    let catalog = Catalog::new(ctx.knowledge_base()?);
    let entry = catalog
        .lookup(id)
        .ok_or_else(|| anyhow!("Unknown disease id '{}'", id))?;
    let view = catalog.view(entry, lang);
    if ctx.json {
        return output::print_json(&view);
    }
    output::print_fact_sheet(&view);
    Ok(())
}

pub fn reconcile(
    ctx: &Context,
    label: Option<String>,
    key: Option<String>,
    lang: Option<String>,
) -> Result<()> {
    if label.is_none() && key.is_none() {
        bail!("Give a classifier label or --key");
    }
    let lang = parse_lang(lang.as_deref())?;
    let kb = ctx.knowledge_base()?;
    let catalog = Catalog::new(kb.clone());
    let reconciler = Reconciler::new(kb);

    let result = match reconciler.explain(key.as_deref(), label.as_deref()) {
        Some(hit) => {
            let view = catalog.view(hit.entry, lang);
            ReconcileResponse {
                matched: true,
                step: Some(hit.step),
                display_name: view.name.clone(),
                disease: Some(view),
            }
        }
        None => ReconcileResponse {
            matched: false,
            step: None,
            disease: None,
            display_name: fallback_label(label.as_deref().or(key.as_deref()).unwrap_or_default()),
        },
    };
    if ctx.json {
        return output::print_json(&result);
    }
    output::print_reconcile(&result);
    Ok(())
}

pub async fn status(ctx: &Context) -> Result<()> {
    let client = AgridClient::new(&ctx.daemon)?;
    let health = client.health().await?;
    if ctx.json {
        return output::print_json(&health);
    }
    output::print_health(&health);
    Ok(())
}

pub fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "agrictl", &mut std::io::stdout());
    Ok(())
}
