use anyhow::{Context, Result};
use clap::Parser;
use nalgebra_glm as glm;
use serde::Serialize;
use std::path::PathBuf;
use studiovis::EditableModel;
use studiovis::animation::{BlendMode, ManualClock, Pose, PoseScratch, StudioEntity};
use studiovis::model::{BoneController, TextureFlags};
use studiovis::settings::Settings;

/// Simulation step used for --ticks.
const TICK_SECONDS: f64 = 1.0 / 30.0;

const AXIS_NAMES: [&str; 6] = ["X", "Y", "Z", "XR", "YR", "ZR"];

#[derive(Parser, Debug)]
#[command(name = "studiovis")]
#[command(version, about = "Inspect, animate and re-save GoldSrc studio models")]
struct Args {
    /// Model file (.mdl)
    model: PathBuf,

    /// Sequence to play instead of the first one
    #[arg(long)]
    sequence: Option<usize>,

    /// Number of 1/30 s steps to advance playback
    #[arg(long, default_value = "0")]
    ticks: u32,

    /// Blend mode, overriding the saved settings (Standard or Counter-Strike)
    #[arg(long, value_parser = parse_blend_mode)]
    blend_mode: Option<BlendMode>,

    /// Print the world origin of this bone after playback
    #[arg(long)]
    bone: Option<String>,

    /// Write the model back out to this path
    #[arg(long)]
    save: Option<PathBuf>,

    /// Export every texture as PNG into this directory
    #[arg(long)]
    export_textures: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_blend_mode(s: &str) -> Result<BlendMode, String> {
    BlendMode::from_name(s).ok_or_else(|| {
        let names: Vec<_> = BlendMode::ALL.iter().map(BlendMode::name).collect();
        format!("unknown blend mode '{s}', expected one of {}", names.join(", "))
    })
}

#[derive(Serialize)]
struct SequenceSummary {
    label: String,
    frames: i32,
    fps: f32,
    looping: bool,
    blends: usize,
    events: usize,
}

#[derive(Serialize)]
struct ControllerSummary {
    slot: i32,
    axis: Option<&'static str>,
    mouth: bool,
    start: f32,
    end: f32,
}

impl ControllerSummary {
    fn new(controller: &BoneController) -> Self {
        Self {
            slot: controller.index,
            axis: controller.axis().map(|axis| AXIS_NAMES[axis]),
            mouth: controller.is_mouth(),
            start: controller.start,
            end: controller.end,
        }
    }
}

#[derive(Serialize)]
struct TextureSummary {
    name: String,
    width: u32,
    height: u32,
    flags: Vec<&'static str>,
}

#[derive(Serialize)]
struct PlaybackSummary {
    sequence: Option<usize>,
    frame: f32,
    blend_mode: &'static str,
    events_fired: usize,
    bone_origins: Vec<[f32; 3]>,
    attachment_origins: Vec<(String, [f32; 3])>,
    skin_textures: Vec<String>,
    bone: Option<(String, [f32; 3])>,
}

#[derive(Serialize)]
struct ModelSummary {
    name: String,
    bones: Vec<String>,
    bone_controllers: Vec<ControllerSummary>,
    hitboxes: usize,
    attachments: usize,
    sequences: Vec<SequenceSummary>,
    bodyparts: Vec<(String, usize)>,
    textures: Vec<TextureSummary>,
    skin_families: usize,
    playback: Option<PlaybackSummary>,
}

impl ModelSummary {
    fn new(model: &EditableModel) -> Self {
        Self {
            name: model.name.clone(),
            bones: model.bones.iter().map(|b| b.name.clone()).collect(),
            bone_controllers: model.bone_controllers.iter().map(ControllerSummary::new).collect(),
            hitboxes: model.hitboxes.len(),
            attachments: model.attachments.len(),
            sequences: model
                .sequences
                .iter()
                .map(|s| SequenceSummary {
                    label: s.label.clone(),
                    frames: s.num_frames,
                    fps: s.fps,
                    looping: s.is_looping(),
                    blends: s.blends.len(),
                    events: s.events.len(),
                })
                .collect(),
            bodyparts: model
                .bodyparts
                .iter()
                .map(|b| (b.name.clone(), b.models.len()))
                .collect(),
            textures: model
                .textures
                .iter()
                .map(|t| TextureSummary {
                    name: t.name.clone(),
                    width: t.width,
                    height: t.height,
                    flags: t.flags().iter().map(TextureFlags::name).collect(),
                })
                .collect(),
            skin_families: model.skin_families.len(),
            playback: None,
        }
    }

    fn print(&self) {
        println!("Model: {}", self.name);
        println!("  Bones: {}", self.bones.len());
        println!("  Bone controllers: {}", self.bone_controllers.len());
        for c in &self.bone_controllers {
            let target = if c.mouth { "mouth".to_string() } else { format!("slot {}", c.slot) };
            println!("    {target} on {} ({} to {})", c.axis.unwrap_or("?"), c.start, c.end);
        }
        println!("  Hitboxes: {}, attachments: {}", self.hitboxes, self.attachments);
        println!("  Sequences: {}", self.sequences.len());
        for (i, s) in self.sequences.iter().enumerate() {
            println!(
                "    [{i}] {} ({} frames @ {} fps{}, {} blends, {} events)",
                s.label,
                s.frames,
                s.fps,
                if s.looping { ", looping" } else { "" },
                s.blends,
                s.events
            );
        }
        for (name, models) in &self.bodyparts {
            println!("  Bodypart {name}: {models} models");
        }
        for t in &self.textures {
            if t.flags.is_empty() {
                println!("  Texture {}: {}x{}", t.name, t.width, t.height);
            } else {
                println!("  Texture {}: {}x{} [{}]", t.name, t.width, t.height, t.flags.join(", "));
            }
        }
        println!("  Skin families: {}", self.skin_families);
        if let Some(p) = &self.playback {
            println!(
                "Playback: sequence {:?} at frame {:.2} ({} blending), {} events fired",
                p.sequence, p.frame, p.blend_mode, p.events_fired
            );
            for (name, [x, y, z]) in &p.attachment_origins {
                println!("  Attachment {name} at ({x:.2}, {y:.2}, {z:.2})");
            }
            if !p.skin_textures.is_empty() {
                println!("  Skin textures: {}", p.skin_textures.join(", "));
            }
            if let Some((name, [x, y, z])) = &p.bone {
                println!("  Bone {name} at ({x:.2}, {y:.2}, {z:.2})");
            }
        }
    }
}

fn to_array(v: &glm::Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

fn play(model: EditableModel, args: &Args, settings: &Settings) -> Result<(EditableModel, PlaybackSummary)> {
    let bone = match &args.bone {
        Some(name) => {
            let index = model
                .find_bone(name)
                .with_context(|| format!("Model has no bone named '{name}'"))?;
            Some((name.clone(), index))
        }
        None => None,
    };

    let clock = ManualClock::default();
    let mut entity = StudioEntity::new(model, Box::new(clock.clone()));
    settings.playback.apply(&mut entity);
    if let Some(mode) = args.blend_mode {
        entity.set_blend_mode(mode);
    }

    if args.sequence.is_some() && !entity.set_sequence(args.sequence) {
        log::warn!("Sequence {:?} does not exist, keeping {:?}", args.sequence, entity.sequence());
    }

    let mut events_fired = 0;
    for _ in 0..args.ticks {
        clock.advance(TICK_SECONDS);
        entity.advance_frame(0.0, settings.playback.max_frame_delta);
        events_fired += entity.dispatch_anim_events(|event| {
            log::info!("Event {} at frame {}: {}", event.event, event.frame, event.options);
        });
    }

    let mut scratch = PoseScratch::default();
    let mut pose = Pose::default();
    entity.pose(&mut scratch, &mut pose);

    let model = entity.model();
    let attachment_origins = model
        .attachments
        .iter()
        .filter_map(|a| {
            let bone = pose.bones.get(a.bone)?;
            Some((a.name.clone(), to_array(&bone.transform_point(&glm::make_vec3(&a.origin)))))
        })
        .collect();
    let skin_textures = (0..model.num_skin_refs())
        .filter_map(|skin_ref| entity.skin_texture(skin_ref))
        .filter_map(|index| model.texture(index))
        .map(|t| t.name.clone())
        .collect();
    let bone = bone.and_then(|(name, index)| Some((name, to_array(&pose.bones.get(index)?.position))));

    let summary = PlaybackSummary {
        sequence: entity.sequence(),
        frame: entity.frame(),
        blend_mode: entity.blend_mode().name(),
        events_fired,
        bone_origins: pose.bones.iter().map(|b| to_array(&b.position)).collect(),
        attachment_origins,
        skin_textures,
        bone,
    };
    Ok((entity.into_model(), summary))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load();

    let model = studiovis::load_model(&args.model)
        .with_context(|| format!("Failed to load model '{}'", args.model.display()))?;

    let mut summary = ModelSummary::new(&model);
    let (model, playback) = play(model, &args, &settings)?;
    summary.playback = Some(playback);

    if let Some(dir) = &args.export_textures {
        let written = studiovis::texture::export_all(&model, dir, settings.export.masked_transparency)
            .with_context(|| format!("Failed to export textures to '{}'", dir.display()))?;
        log::info!("Exported {} textures", written.len());
    }

    if let Some(out) = &args.save {
        studiovis::save_model(out, &model)
            .with_context(|| format!("Failed to save model '{}'", out.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }

    Ok(())
}
