//! Content sections
//!
//! Five regions laid out around the start: intro, crossroads, projects,
//! information and playground. Sections only get the narrow [`SectionContext`]
//! they build into; the world attaches each section container itself.

use crate::assets::LoadedItems;
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::tween::Param;
use crate::world::areas::{Areas, ZoneHandle, ZoneSpec};
use crate::world::objects::{ObjectSpec, Objects};
use crate::world::tiles::Tiles;
use crate::world::walls::{WallShape, WallSpec, Walls};
use crate::world::zones::Zones;

/// Subsystems a section may build into
pub struct SectionContext<'a> {
    /// Scene graph owned by the world
    pub scene: &'a mut SceneGraph,
    /// Loaded asset store
    pub items: &'a LoadedItems,
    /// Object collection
    pub objects: &'a mut Objects,
    /// Interactive zone registry
    pub areas: &'a mut Areas,
    /// Physics trigger zones
    pub zones: &'a mut Zones,
    /// Tile paths
    pub tiles: &'a mut Tiles,
    /// Wall builder
    pub walls: &'a mut Walls,
    /// Touch mode
    pub touch: bool,
}

/// Section identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Title and driving instructions, around the start
    Intro,
    /// Junction leading to the other sections
    Crossroads,
    /// Project boards
    Projects,
    /// Contact links
    Information,
    /// Bowling alley and brick wall
    Playground,
}

impl SectionKind {
    /// Every section, in construction order
    pub const ALL: [Self; 5] = [
        Self::Intro,
        Self::Crossroads,
        Self::Projects,
        Self::Information,
        Self::Playground,
    ];

    /// Short name
    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Crossroads => "crossroads",
            Self::Projects => "projects",
            Self::Information => "information",
            Self::Playground => "playground",
        }
    }

    /// Ground-plane origin
    pub fn origin(self) -> Vec2 {
        match self {
            Self::Intro => Vec2::new(0.0, 0.0),
            Self::Crossroads => Vec2::new(0.0, -30.0),
            Self::Projects => Vec2::new(30.0, -30.0),
            Self::Information => Vec2::new(1.2, -55.0),
            Self::Playground => Vec2::new(-38.0, -34.0),
        }
    }
}

/// A built section
#[derive(Debug)]
pub struct Section {
    kind: SectionKind,
    container: NodeId,
    trigger: usize,
    links: Vec<(String, ZoneHandle)>,
}

impl Section {
    fn new(
        ctx: &mut SectionContext<'_>,
        kind: SectionKind,
        half_extents: Vec2,
    ) -> Result<Self, SceneError> {
        let container = ctx.scene.create(kind.name());
        ctx.scene.set_position(container, kind.origin().push(0.0))?;
        let trigger = ctx.zones.add(kind.origin(), half_extents, kind.name());
        Ok(Self {
            kind,
            container,
            trigger,
            links: Vec::new(),
        })
    }

    /// Section identifier
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Index of the section's trigger zone
    pub fn trigger(&self) -> usize {
        self.trigger
    }

    /// Interactive link zones by name
    pub fn links(&self) -> &[(String, ZoneHandle)] {
        &self.links
    }

    fn origin3(&self, x: f32, y: f32, z: f32) -> Vec3 {
        let origin = self.kind.origin();
        Vec3::new(origin.x + x, origin.y + y, z)
    }

    fn add_link(
        &mut self,
        ctx: &mut SectionContext<'_>,
        name: &str,
        offset: Vec2,
    ) -> Result<(), SceneError> {
        let spec = ZoneSpec::new(self.kind.origin() + offset, Vec2::new(1.0, 1.0));
        let zone = ctx.areas.register(ctx.scene, spec)?;
        self.links.push((name.to_string(), zone));
        Ok(())
    }
}

/// Intro section with its instruction labels
#[derive(Debug)]
pub struct IntroSection {
    section: Section,
    instructions_label: Param,
    other_instructions_label: Option<Param>,
}

impl IntroSection {
    const LETTERS: [(&'static str, f32); 10] = [
        ("B", -4.5),
        ("R", -3.5),
        ("U", -2.5),
        ("N", -1.5),
        ("O", -0.5),
        ("S", 0.5),
        ("I", 1.5),
        ("M", 2.5),
        ("O", 3.5),
        ("N", 4.5),
    ];

    fn new(ctx: &mut SectionContext<'_>) -> Result<Self, SceneError> {
        let section = Section::new(ctx, SectionKind::Intro, Vec2::new(12.0, 12.0))?;

        ctx.scene.create_child(section.container, "instructions_arrows")?;
        let other_instructions_label = if ctx.touch {
            None
        } else {
            ctx.scene.create_child(section.container, "other_instructions")?;
            Some(Param::new(0.0))
        };

        for (index, (letter, x)) in Self::LETTERS.iter().enumerate() {
            let name = format!("intro_letter_{}", index);
            let spec = ObjectSpec::new(name, section.origin3(*x, 5.0, 0.0))
                .with_base(format!("intro{}Base", letter))
                .with_mass(1.5)
                .with_floor_shadow(Vec2::new(1.0, 1.0));
            ctx.objects.add(ctx.scene, ctx.items, spec)?;
        }

        ctx.tiles
            .add(ctx.scene, ctx.objects, ctx.items, Vec2::new(0.0, -4.5), Vec2::new(0.0, -4.5))?;

        Ok(Self {
            section,
            instructions_label: Param::new(0.0),
            other_instructions_label,
        })
    }

    /// Generic section data
    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Opacity of the driving-instructions label
    pub fn instructions_label(&self) -> &Param {
        &self.instructions_label
    }

    /// Opacity of the keyboard-only label, absent in touch mode
    pub fn other_instructions_label(&self) -> Option<&Param> {
        self.other_instructions_label.as_ref()
    }
}

/// All sections
#[derive(Debug)]
pub struct Sections {
    intro: IntroSection,
    crossroads: Section,
    projects: Section,
    information: Section,
    playground: Section,
}

impl Sections {
    /// Build every section in order
    pub fn new(mut ctx: SectionContext<'_>) -> Result<Self, SceneError> {
        let intro = IntroSection::new(&mut ctx)?;
        let crossroads = Self::crossroads(&mut ctx)?;
        let projects = Self::projects(&mut ctx)?;
        let information = Self::information(&mut ctx)?;
        let playground = Self::playground(&mut ctx)?;
        log::debug!("Built {} sections", SectionKind::ALL.len());

        Ok(Self {
            intro,
            crossroads,
            projects,
            information,
            playground,
        })
    }

    /// Intro section
    pub fn intro(&self) -> &IntroSection {
        &self.intro
    }

    /// Section by kind
    pub fn get(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::Intro => &self.intro.section,
            SectionKind::Crossroads => &self.crossroads,
            SectionKind::Projects => &self.projects,
            SectionKind::Information => &self.information,
            SectionKind::Playground => &self.playground,
        }
    }

    /// Section containers, in construction order
    pub fn containers(&self) -> Vec<NodeId> {
        SectionKind::ALL.iter().map(|kind| self.get(*kind).container()).collect()
    }

    fn crossroads(ctx: &mut SectionContext<'_>) -> Result<Section, SceneError> {
        let section = Section::new(ctx, SectionKind::Crossroads, Vec2::new(10.0, 10.0))?;
        let origin = SectionKind::Crossroads.origin();
        let paths = [
            (Vec2::new(0.0, 10.0), Vec2::new(0.0, 8.0)),
            (Vec2::new(12.5, 0.0), Vec2::new(7.5, 0.0)),
            (Vec2::new(-13.0, 0.0), Vec2::new(-6.0, 0.0)),
            (Vec2::new(0.0, -4.5), Vec2::new(0.0, -18.0)),
        ];
        for (start, delta) in paths {
            ctx.tiles.add(ctx.scene, ctx.objects, ctx.items, origin + start, delta)?;
        }
        Ok(section)
    }

    fn projects(ctx: &mut SectionContext<'_>) -> Result<Section, SceneError> {
        const PROJECTS: [&str; 4] = ["threejsJourney", "madbox", "scoutOMatic", "chartogne"];
        let mut section = Section::new(ctx, SectionKind::Projects, Vec2::new(20.0, 12.0))?;
        for (index, name) in PROJECTS.iter().enumerate() {
            let x = index as f32 * 8.0;
            let board = ObjectSpec::new(format!("project_{}", name), section.origin3(x, 0.0, 0.0))
                .with_base("projectsBoardStructure")
                .with_mass(0.0)
                .with_floor_shadow(Vec2::new(5.0, 1.0));
            ctx.objects.add(ctx.scene, ctx.items, board)?;
            section.add_link(ctx, name, Vec2::new(x, -3.0))?;
        }
        Ok(section)
    }

    fn information(ctx: &mut SectionContext<'_>) -> Result<Section, SceneError> {
        const LINKS: [&str; 4] = ["twitter", "github", "linkedin", "mail"];
        let mut section = Section::new(ctx, SectionKind::Information, Vec2::new(8.0, 6.0))?;
        for (index, name) in LINKS.iter().enumerate() {
            section.add_link(ctx, name, Vec2::new(index as f32 * 1.4 - 2.1, 0.0))?;
        }
        let baguettes = ObjectSpec::new("information_baguettes", section.origin3(-4.0, 2.0, 0.5))
            .with_base("informationBaguetteBase")
            .with_mass(1.0)
            .with_floor_shadow(Vec2::new(2.0, 0.5));
        ctx.objects.add(ctx.scene, ctx.items, baguettes)?;
        Ok(section)
    }

    fn playground(ctx: &mut SectionContext<'_>) -> Result<Section, SceneError> {
        let section = Section::new(ctx, SectionKind::Playground, Vec2::new(14.0, 14.0))?;

        let mut pin = 0;
        for row in 0..4 {
            for column in 0..=row {
                let x = column as f32 * 0.4 - row as f32 * 0.2;
                let position = section.origin3(x, 15.0 + row as f32 * 0.35, 0.0);
                let spec = ObjectSpec::new(format!("bowling_pin_{}", pin), position)
                    .with_base("bowlingPinBase")
                    .with_mass(0.1)
                    .with_floor_shadow(Vec2::new(0.4, 0.4));
                ctx.objects.add(ctx.scene, ctx.items, spec)?;
                pin += 1;
            }
        }
        let ball = ObjectSpec::new("bowling_ball", section.origin3(0.0, 5.0, 0.0))
            .with_base("bowlingBallBase")
            .with_mass(1.0)
            .with_floor_shadow(Vec2::new(0.6, 0.6));
        ctx.objects.add(ctx.scene, ctx.items, ball)?;

        ctx.walls.add(
            ctx.scene,
            ctx.objects,
            ctx.items,
            &WallSpec {
                shape: WallShape::Brick,
                position: section.origin3(-12.0, 0.0, 0.0),
                width_count: 5,
                height_count: 6,
                offset_width: Vec3::new(0.0, 1.05, 0.0),
                offset_height: Vec3::new(0.0, 0.0, 0.45),
                base: "brickBase".into(),
                mass: 0.5,
            },
        )?;
        Ok(section)
    }
}
