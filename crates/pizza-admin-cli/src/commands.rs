//! Command execution against the page layer

use crate::backend::Backend;
use crate::cli::{Cli, Commands};
use crate::output;
use anyhow::{Context, bail};
use pizza_admin_core::{
    AccessOperation, Config, Entity, EntityId, EntityKind, MenuItem, Order, OrderItem,
    PizzaRestaurant, StaticPolicy, User,
};
use pizza_admin_view::{
    CreatePage, DetailPage, EditPage, ListPage, Navigator, PageContext, RecordingNavigator, Route,
};
use std::sync::Arc;
use tracing::info;

/// Run `$f::<E>` for the entity type `$kind` names
macro_rules! with_entity {
    ($kind:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            EntityKind::PizzaRestaurant => $f::<PizzaRestaurant>($($arg),*).await,
            EntityKind::MenuItem => $f::<MenuItem>($($arg),*).await,
            EntityKind::Order => $f::<Order>($($arg),*).await,
            EntityKind::OrderItem => $f::<OrderItem>($($arg),*).await,
            EntityKind::User => $f::<User>($($arg),*).await,
        }
    };
}

/// Backend and page collaborators for one invocation
#[derive(Debug)]
pub struct Session {
    backend: Backend,
    context: PageContext,
    navigator: Arc<RecordingNavigator>,
}

impl Session {
    /// Session using the capability grants from `config`
    #[must_use]
    pub fn new(backend: Backend, config: &Config) -> Self {
        let navigator = Arc::new(RecordingNavigator::new());
        let shared: Arc<dyn Navigator> = navigator.clone();
        let context = PageContext::new(Arc::new(StaticPolicy::from_config(&config.access)), shared)
            .with_scope(config.access.scope);
        Self {
            backend,
            context,
            navigator,
        }
    }

    /// Routes the pages asked to navigate to
    #[must_use]
    pub fn navigations(&self) -> Vec<Route> {
        self.navigator.routes()
    }
}

/// Execute the parsed command line and return what to print
///
/// # Errors
///
/// Returns an error when a page refuses to mount, a fetch or mutation fails,
/// or form input is invalid.
pub async fn execute(cli: &Cli, config: &Config) -> anyhow::Result<String> {
    if let Commands::Config { show } = &cli.command {
        return show_config(config, *show);
    }

    let backend = if cli.mock {
        Backend::demo()?
    } else {
        Backend::http(&config.api)?
    };
    let session = Session::new(backend, config);
    run(&session, &cli.command).await
}

/// Execute an entity command within `session`
///
/// # Errors
///
/// See [`execute`].
pub async fn run(session: &Session, command: &Commands) -> anyhow::Result<String> {
    match command {
        Commands::List { entity } => with_entity!(*entity, list(session)),
        Commands::Show { entity, id } => {
            let id = EntityId::from(id.as_str());
            with_entity!(*entity, show(session, &id))
        }
        Commands::Create { entity, set } => with_entity!(*entity, create(session, set)),
        Commands::Update { entity, id, set } => {
            let id = EntityId::from(id.as_str());
            with_entity!(*entity, update(session, id, set))
        }
        Commands::Delete { entity, id } => {
            let id = EntityId::from(id.as_str());
            with_entity!(*entity, delete(session, &id))
        }
        Commands::Config { .. } => bail!("config is not an entity command"),
    }
}

fn show_config(config: &Config, show: bool) -> anyhow::Result<String> {
    if show {
        toml::to_string_pretty(config).context("failed to serialize configuration")
    } else {
        Ok("configuration is valid".to_string())
    }
}

async fn list<E: Entity>(session: &Session) -> anyhow::Result<String> {
    let page = ListPage::<E>::mount(session.backend.store(), session.context.clone())?;
    page.load().await;

    let view = page.render();
    if let Some(error) = view.fetch_error {
        bail!(error);
    }
    info!(entity = %E::KIND, rows = view.rows.len(), "listed records");
    Ok(output::list(&view))
}

async fn show<E: Entity>(session: &Session, id: &EntityId) -> anyhow::Result<String> {
    let page = DetailPage::<E>::mount(
        session.backend.store(),
        session.backend.deleter(),
        session.context.clone(),
    )?;
    page.load(id).await;

    let view = page.render();
    if let Some(error) = view.fetch_error {
        bail!(error);
    }
    Ok(output::detail(&view))
}

async fn create<E: Entity>(
    session: &Session,
    assignments: &[(String, String)],
) -> anyhow::Result<String> {
    let page = CreatePage::<E>::mount(session.backend.store(), session.context.clone(), None)?;
    page.load().await;
    for (field, value) in assignments {
        page.set_field(field, value)?;
    }

    if let Some(record) = page.submit().await {
        info!(entity = %E::KIND, id = %record.id(), "record created");
        return Ok(format!(
            "created {} {}\n{}",
            E::KIND.display_name(),
            record.id(),
            output::record(&record)
        ));
    }

    let view = page.render();
    if let Some(error) = view.form_error {
        bail!(error);
    }
    match output::field_errors(&view.fields) {
        Some(errors) => bail!("invalid {}\n{errors}", E::KIND.display_name()),
        None => bail!("{} was not created", E::KIND.display_name()),
    }
}

async fn update<E: Entity>(
    session: &Session,
    id: EntityId,
    assignments: &[(String, String)],
) -> anyhow::Result<String> {
    let page = EditPage::<E>::mount(session.backend.store(), &session.context, id)?;
    page.load().await;
    if let Some(error) = page.render().fetch_error {
        bail!(error);
    }
    for (field, value) in assignments {
        page.set_field(field, value)?;
    }

    if let Some(record) = page.submit().await {
        info!(entity = %E::KIND, id = %record.id(), "record updated");
        return Ok(format!(
            "updated {} {}\n{}",
            E::KIND.display_name(),
            record.id(),
            output::record(&record)
        ));
    }

    let view = page.render();
    if let Some(error) = view.form_error {
        bail!(error);
    }
    match output::field_errors(&view.fields) {
        Some(errors) => bail!("invalid {}\n{errors}", E::KIND.display_name()),
        None => bail!("{} {} was not updated", E::KIND.display_name(), view.id),
    }
}

async fn delete<E: Entity>(session: &Session, id: &EntityId) -> anyhow::Result<String> {
    // The list page only offers delete next to edit
    session.context.authorize(E::KIND, AccessOperation::Update)?;
    session.context.authorize(E::KIND, AccessOperation::Delete)?;

    let page = ListPage::<E>::mount(session.backend.store(), session.context.clone())?;
    if !page.delete(id).await {
        let error = page
            .controller()
            .mutation_error()
            .map_or_else(|| "delete failed".to_string(), |e| e.to_string());
        bail!(error);
    }
    info!(entity = %E::KIND, %id, "record deleted");
    Ok(format!("deleted {} {id}", E::KIND.display_name()))
}
