// Collision layers and the masks queries filter with

/// Collision layers for filtering which objects a query can see
///
/// Every collider belongs to exactly one layer; queries pass a `LayerMask`
/// built from the layers they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionLayer {
    /// Static level geometry (floors, walls, ceilings)
    World = 0b0000_0001,

    /// Player-controlled characters
    Player = 0b0000_0010,

    /// AI-controlled characters
    Enemy = 0b0000_0100,

    /// In-flight projectiles
    Projectile = 0b0000_1000,

    /// Trigger volumes - never block movement
    Trigger = 0b0001_0000,
}

impl CollisionLayer {
    /// Mask containing only this layer
    pub fn mask(self) -> LayerMask {
        LayerMask(self as u32)
    }

    /// Default mask of layers that this layer is blocked by when moving
    pub fn movement_filter(self) -> LayerMask {
        match self {
            // Characters collide with the level and with each other
            CollisionLayer::Player | CollisionLayer::Enemy => {
                LayerMask::CHARACTERS.with(CollisionLayer::World)
            }
            // Projectiles hit anything solid
            CollisionLayer::Projectile => LayerMask::SOLID,
            CollisionLayer::World => LayerMask::CHARACTERS,
            CollisionLayer::Trigger => LayerMask::NONE,
        }
    }
}

/// A set of collision layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const CHARACTERS: LayerMask =
        LayerMask(CollisionLayer::Player as u32 | CollisionLayer::Enemy as u32);
    /// Everything that physically blocks movement and shots
    pub const SOLID: LayerMask = LayerMask(
        CollisionLayer::World as u32 | CollisionLayer::Player as u32 | CollisionLayer::Enemy as u32,
    );

    /// Add a layer to the mask
    pub const fn with(self, layer: CollisionLayer) -> LayerMask {
        LayerMask(self.0 | layer as u32)
    }

    /// Remove a layer from the mask
    pub const fn without(self, layer: CollisionLayer) -> LayerMask {
        LayerMask(self.0 & !(layer as u32))
    }

    /// Check whether the mask includes a layer
    pub fn contains(self, layer: CollisionLayer) -> bool {
        self.0 & layer as u32 != 0
    }
}

impl From<CollisionLayer> for LayerMask {
    fn from(layer: CollisionLayer) -> Self {
        layer.mask()
    }
}
