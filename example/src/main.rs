use std::{path::Path, sync::Arc};

use serde::Serialize;
use tracing::info;
use ztpl::{Config, MemoryCache};


#[derive(Serialize)]
pub struct Todo {
    pub id: u32,
    pub label: String,
    pub done: bool,
}

#[derive(Serialize)]
pub struct TodoList {
    pub title: String,
    pub todos: Vec<Todo>,
}

mod templates {
    ztpl::file!("templates/button.ztpl", z: crate::Todo);
    ztpl::directory!("native/", z: crate::TodoList);
    //language=html
    ztpl::str!("hello_first_last", r#"
        <p>Hello [[- z.0 ]] [[- z.1 ]]</p>
    "#, z: (&str, &str));
}

fn sample() -> TodoList {
    TodoList {
        title: "Chores & Errands".to_string(),
        todos: vec![
            Todo {
                id: 42,
                label: "My Todo".to_string(),
                done: false,
            },
            Todo {
                id: 43,
                label: "Fish <and> chips".to_string(),
                done: true,
            },
        ],
    }
}

fn main() -> ztpl::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ztpl=debug".into()),
        )
        .init();

    let list = sample();

    // compiled by the macros, code markers are Rust
    println!("{}", templates::todo_list(&list));
    println!("{}", templates::summary(&list));
    println!("{}", templates::hello_first_last(&("King", "Tubby")));

    // compiled at runtime, code markers are script
    let cache = Arc::new(MemoryCache::new());
    let config = Config::default()
        .with_base_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
        .with_cache(cache.clone());
    let page = ztpl::Compiler::new(config).compile_file(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("templates")
            .join("page.ztpl"),
    )?;
    println!("{}", page.render_serialize(&list)?);
    info!(partials = cache.len(), "rendered page");
    Ok(())
}
