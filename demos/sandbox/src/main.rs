// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Proteus Sandbox
// Demo binary: loads a script universe, plays with some live state, then
// reloads an edited version of the scripts and shows what survived.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use proteus_core::compiler::{ChangeKind, CompileDiagnostic, CompileOptions, ProjectDescription};
use proteus_core::{ObjectId, UniverseId};
use proteus_script::compiler::{CompileOutput, ScriptCompiler};
use proteus_script::value::StructValue;
use proteus_script::{TypeUniverse, UniverseBuilder, Value, ValueType};
use proteus_upgrade::ScriptReloader;

/// Stands in for the real script toolchain: every compilation pops the next
/// queued output, so "editing the scripts" is just queueing new definitions.
struct DemoCompiler {
    outputs: Mutex<VecDeque<CompileOutput>>,
}

impl DemoCompiler {
    fn new(outputs: Vec<CompileOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
        }
    }

    fn next(&self) -> CompileOutput {
        self.outputs.lock().unwrap().pop_front().unwrap_or_else(|| {
            CompileOutput::failed(vec![CompileDiagnostic::error("no compilation queued")])
        })
    }
}

#[async_trait]
impl ScriptCompiler for DemoCompiler {
    async fn compile(
        &self,
        _project: &ProjectDescription,
        _options: &CompileOptions,
    ) -> CompileOutput {
        self.next()
    }

    async fn incremental_compile(
        &self,
        _existing: UniverseId,
        _changed: &HashMap<PathBuf, ChangeKind>,
        _options: &CompileOptions,
    ) -> CompileOutput {
        self.next()
    }
}

/// The scripts as first written.
fn version_one() -> CompileOutput {
    let defs = UniverseBuilder::new()
        .class("game.Game")
        .with_static_field("launches", ValueType::Int)
        .with_field("hero", ValueType::Class("game.Actor".into()))
        .with_field("motd", ValueType::Str)
        .finish()
        .class("game.Actor")
        .with_field("name", ValueType::Str)
        .with_field("health", ValueType::Int)
        .with_field("speed", ValueType::Float)
        .with_field("buddy", ValueType::Class("game.Actor".into()))
        .with_field("inventory", ValueType::List(Box::new(ValueType::Str)))
        .with_field("stats", ValueType::Struct("game.Stats".into()))
        .with_event_handler("on_tick")
        .finish()
        .struct_type("game.Stats")
        .with_field("strength", ValueType::Int)
        .with_field("luck", ValueType::Float)
        .finish()
        .class("game.Relic")
        .with_static_field("blessing", ValueType::Int)
        .finish()
        .build_defs();
    CompileOutput::succeeded(defs)
}

/// The same scripts after the developer's edit: actors lose `speed` and
/// gain `armor`, `game.Stats` trades `luck` for `agility`, and the unused
/// `game.Relic` class is deleted outright.
fn version_two() -> CompileOutput {
    let defs = UniverseBuilder::new()
        .class("game.Game")
        .with_static_field("launches", ValueType::Int)
        .with_field("hero", ValueType::Class("game.Actor".into()))
        .with_field("motd", ValueType::Str)
        .finish()
        .class("game.Actor")
        .with_field("name", ValueType::Str)
        .with_field("health", ValueType::Int)
        .with_field("armor", ValueType::Int)
        .with_field("buddy", ValueType::Class("game.Actor".into()))
        .with_field("inventory", ValueType::List(Box::new(ValueType::Str)))
        .with_field("stats", ValueType::Struct("game.Stats".into()))
        .with_event_handler("on_tick")
        .finish()
        .struct_type("game.Stats")
        .with_field("strength", ValueType::Int)
        .with_field("agility", ValueType::Float)
        .finish()
        .build_defs();
    CompileOutput::succeeded(defs)
}

fn show_actor(universe: &TypeUniverse, label: &str, id: ObjectId) {
    if let Some(actor) = universe.object(id) {
        println!("  {label} ({}, {id}):", actor.type_name);
        for slot in ["name", "health", "speed", "armor", "buddy", "inventory", "stats"] {
            if let Some(value) = actor.slot(slot) {
                println!("    {slot:<9} = {value:?}");
            }
        }
    }
}

fn show_world(reloader: &ScriptReloader) -> Result<()> {
    let universe = reloader.universe().context("no universe loaded")?;
    println!("  universe  {}", universe.id());
    println!(
        "  launches  {:?}",
        universe.static_value("game.Game", "launches")
    );
    if let Some(root) = reloader.root() {
        if let Some(game) = universe.object(root.object) {
            println!("  root ({}, {}):", game.type_name, root.object);
            println!("    motd      = {:?}", game.slot("motd"));
            println!("    hero      = {:?}", game.slot("hero"));
            if let Some(hero) = game.slot("hero").and_then(Value::as_object) {
                show_actor(universe, "hero", hero);
                if let Some(buddy) = universe
                    .object(hero)
                    .and_then(|actor| actor.slot("buddy"))
                    .and_then(Value::as_object)
                {
                    show_actor(universe, "buddy", buddy);
                }
            }
        }
    }
    println!("  entities  {}", reloader.entities().len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("proteus", log::LevelFilter::Debug)
        .init();

    let project = ProjectDescription {
        name: "sandbox".into(),
        root: PathBuf::from("scripts"),
        sources: vec![
            PathBuf::from("scripts/game.ps"),
            PathBuf::from("scripts/actor.ps"),
        ],
    };
    let compiler = DemoCompiler::new(vec![version_one(), version_two()]);
    let mut reloader = ScriptReloader::new(Box::new(compiler), project);

    reloader.load().await?;
    let root = reloader.spawn_root("game.Game")?;
    let kara = reloader.spawn_entity("game.Actor")?;
    let brin = reloader.spawn_entity("game.Actor")?;

    // Play the game for a bit.
    {
        let universe = reloader.universe_mut().context("no universe loaded")?;
        universe.set_static("game.Game", "launches", Value::Int(3));
        universe.set_static("game.Relic", "blessing", Value::Int(7));

        let game = universe.object_mut(root.object).context("root vanished")?;
        game.set_slot("hero", Value::Object(kara.object));
        game.set_slot("motd", Value::Str("Welcome back, pilot.".into()));

        let mut stats = StructValue::new("game.Stats");
        stats.set_field("strength", Value::Int(17));
        stats.set_field("luck", Value::Float(0.25));

        let hero = universe.object_mut(kara.object).context("hero vanished")?;
        hero.set_slot("name", Value::Str("Kara".into()));
        hero.set_slot("health", Value::Int(82));
        hero.set_slot("speed", Value::Float(6.5));
        hero.set_slot("buddy", Value::Object(brin.object));
        hero.set_slot(
            "inventory",
            Value::List(vec![
                Value::Str("sword".into()),
                Value::Str("lantern".into()),
            ]),
        );
        hero.set_slot("stats", Value::Struct(stats));

        let buddy = universe.object_mut(brin.object).context("buddy vanished")?;
        buddy.set_slot("name", Value::Str("Brin".into()));
        buddy.set_slot("health", Value::Int(64));
        buddy.set_slot("buddy", Value::Object(kara.object));
    }

    println!("--- before reload ---");
    show_world(&reloader)?;

    // The developer edits the scripts and hits save.
    let report = reloader.reload().await?;

    println!("--- after reload ---");
    println!("  {report}");
    show_world(&reloader)?;

    while let Ok(event) = reloader.events().receiver().try_recv() {
        println!("  event: {event:?}");
    }

    Ok(())
}
