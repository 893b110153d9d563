//! Element definitions and registry

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::particle::R_TEMP;

/// Built-in element IDs
pub struct ElementId;

impl ElementId {
    pub const NONE: u16 = 0;

    // Powders
    pub const DUST: u16 = 1;
    pub const STNE: u16 = 2;
    pub const SAND: u16 = 3;
    pub const GUNP: u16 = 4;
    pub const SNOW: u16 = 5;
    pub const SALT: u16 = 6;
    pub const BRMT: u16 = 7;
    pub const BGLA: u16 = 8;
    pub const PLUT: u16 = 9;
    pub const URAN: u16 = 10;
    pub const CNCT: u16 = 11;
    pub const BCOL: u16 = 12;
    pub const DEST: u16 = 13;
    pub const ANAR: u16 = 14;
    pub const PQRT: u16 = 15;
    pub const GBMB: u16 = 16;
    pub const BVBR: u16 = 17;
    pub const SAWD: u16 = 18;
    pub const EMBR: u16 = 19;
    pub const RAZR: u16 = 20;
    pub const ISZS: u16 = 21;

    // Liquids
    pub const WATR: u16 = 22;
    pub const DSTW: u16 = 23;
    pub const SLTW: u16 = 24;
    pub const OIL: u16 = 25;
    pub const LAVA: u16 = 26;
    pub const NITR: u16 = 27;
    pub const ACID: u16 = 28;
    pub const MWAX: u16 = 29;
    pub const LN2: u16 = 30;
    pub const DEUT: u16 = 31;
    pub const GEL: u16 = 32;
    pub const GLOW: u16 = 33;
    pub const ISOZ: u16 = 34;
    pub const BIZR: u16 = 35;
    pub const EXOT: u16 = 36;
    pub const MERC: u16 = 37;
    pub const SOAP: u16 = 38;

    // Gases
    pub const GAS: u16 = 39;
    pub const WTRV: u16 = 40;
    pub const FIRE: u16 = 41;
    pub const SMKE: u16 = 42;
    pub const PLSM: u16 = 43;
    pub const H2: u16 = 44;
    pub const O2: u16 = 45;
    pub const CO2: u16 = 46;
    pub const BIZRG: u16 = 47;
    pub const CFLM: u16 = 48;

    // Energy particles
    pub const PHOT: u16 = 49;
    pub const NEUT: u16 = 50;
    pub const ELEC: u16 = 51;
    pub const PROT: u16 = 52;
    pub const GRVT: u16 = 53;
    pub const THDR: u16 = 54;

    // Solids
    pub const METL: u16 = 55;
    pub const WOOD: u16 = 56;
    pub const GLAS: u16 = 57;
    pub const DMND: u16 = 58;
    pub const INSL: u16 = 59;
    pub const BMTL: u16 = 60;
    pub const BRCK: u16 = 61;
    pub const PSCN: u16 = 62;
    pub const NSCN: u16 = 63;
    pub const IRON: u16 = 64;
    pub const TTAN: u16 = 65;
    pub const GOLD: u16 = 66;
    pub const TUNG: u16 = 67;
    pub const QRTZ: u16 = 68;
    pub const COAL: u16 = 69;
    pub const PLNT: u16 = 70;
    pub const ICEI: u16 = 71;
    pub const WAX: u16 = 72;
    pub const CLNE: u16 = 73;
    pub const PCLN: u16 = 74;
    pub const BCLN: u16 = 75;
    pub const PBCN: u16 = 76;
    pub const VOID: u16 = 77;
    pub const PVOD: u16 = 78;
    pub const BHOL: u16 = 79;
    pub const NBHL: u16 = 80;
    pub const WHOL: u16 = 81;
    pub const NWHL: u16 = 82;
    pub const LCRY: u16 = 83;
    pub const SWCH: u16 = 84;
    pub const HSWC: u16 = 85;
    pub const INVIS: u16 = 86;
    pub const PINV: u16 = 87;
    pub const FILT: u16 = 88;
    pub const C5: u16 = 89;
    pub const STOR: u16 = 90;
    pub const PRTI: u16 = 91;
    pub const PRTO: u16 = 92;
    pub const PPTI: u16 = 93;
    pub const PPTO: u16 = 94;
    pub const SPNG: u16 = 95;
    pub const TRON: u16 = 96;
    pub const VIBR: u16 = 97;
    pub const SPRK: u16 = 98;
    pub const GPMP: u16 = 99;
    pub const BIZRS: u16 = 100;
    pub const ROCK: u16 = 101;
    pub const SPAWN: u16 = 102;
    pub const SPAWN2: u16 = 103;
    pub const LOLZ: u16 = 104;
    pub const LOVE: u16 = 105;
    pub const LIGH: u16 = 106;
    pub const TESC: u16 = 107;
    pub const MOVS: u16 = 108;
    pub const INST: u16 = 109;
    pub const DTEC: u16 = 110;

    // Characters
    pub const STKM: u16 = 111;
    pub const STKM2: u16 = 112;
    pub const FIGH: u16 = 113;

    /// Number of built-in element slots (including NONE)
    pub const COUNT: usize = 114;
}

bitflags! {
    /// Category and behaviour flags of an element
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ElementProperties: u32 {
        const TYPE_PART = 1 << 0;
        const TYPE_LIQUID = 1 << 1;
        const TYPE_SOLID = 1 << 2;
        const TYPE_GAS = 1 << 3;
        const TYPE_ENERGY = 1 << 4;
        const CONDUCTS = 1 << 5;
        /// Moved aside when a neutron passes through
        const NEUTPENETRATE = 1 << 6;
        /// Swallows neutrons
        const NEUTABSORB = 1 << 7;
        /// Neutrons pass straight through
        const NEUTPASS = 1 << 8;
        const DEADLY = 1 << 9;
        const RADIOACTIVE = 1 << 10;
        const CLONE = 1 << 11;
        const BREAKABLECLONE = 1 << 12;
        /// Nothing may displace it
        const INDESTRUCTIBLE = 1 << 13;
        /// Life counts down towards zero every tick
        const LIFE_DEC = 1 << 14;
        /// Dies when life reaches zero
        const LIFE_KILL_DEC = 1 << 15;

        const MOVABLE = Self::TYPE_PART.bits()
            | Self::TYPE_LIQUID.bits()
            | Self::TYPE_GAS.bits()
            | Self::TYPE_ENERGY.bits();
    }
}

/// How an element falls under gravity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Falldown {
    /// Does not fall (solids, gases, energy)
    #[default]
    Static,
    /// Falls and piles up
    Powder,
    /// Falls and flows sideways
    Liquid,
}

/// Static metadata of an element
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementDef {
    pub id: u16,
    pub name: String,
    /// Displacement rank: heavier movers push lighter occupants aside
    pub weight: i32,
    pub properties: ElementProperties,
    pub falldown: Falldown,
    /// Heat conductivity (0 = insulating)
    pub heat_conduct: u8,
    /// Acceleration along the gravity field per tick
    pub gravity: f32,
    /// How strongly wind carries the particle
    pub advection: f32,
    /// Velocity retained per tick
    pub loss: f32,
    /// Velocity retained after a blocked move
    pub collision: f32,
    pub default_life: i32,
    pub default_ctype: i32,
    pub default_temp: f32,
    /// False for unregistered table slots
    pub enabled: bool,
}

impl ElementDef {
    pub fn has(&self, flags: ElementProperties) -> bool {
        self.properties.intersects(flags)
    }

    pub fn is_energy(&self) -> bool {
        self.properties.contains(ElementProperties::TYPE_ENERGY)
    }

    pub fn is_gas(&self) -> bool {
        self.properties.contains(ElementProperties::TYPE_GAS)
    }

    pub fn is_liquid(&self) -> bool {
        self.properties.contains(ElementProperties::TYPE_LIQUID)
    }

    pub fn is_solid(&self) -> bool {
        self.properties.contains(ElementProperties::TYPE_SOLID)
    }

    pub fn is_part(&self) -> bool {
        self.properties.contains(ElementProperties::TYPE_PART)
    }
}

impl Default for ElementDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            weight: 100,
            properties: ElementProperties::empty(),
            falldown: Falldown::Static,
            heat_conduct: 0,
            gravity: 0.0,
            advection: 0.0,
            loss: 0.0,
            collision: 0.0,
            default_life: 0,
            default_ctype: 0,
            default_temp: R_TEMP,
            enabled: false,
        }
    }
}

fn powder(id: u16, name: &str, weight: i32, heat_conduct: u8) -> ElementDef {
    ElementDef {
        id,
        name: name.to_string(),
        weight,
        properties: ElementProperties::TYPE_PART,
        falldown: Falldown::Powder,
        heat_conduct,
        gravity: 0.1,
        advection: 0.4,
        loss: 0.95,
        collision: -0.1,
        ..Default::default()
    }
}

fn liquid(id: u16, name: &str, weight: i32, heat_conduct: u8) -> ElementDef {
    ElementDef {
        id,
        name: name.to_string(),
        weight,
        properties: ElementProperties::TYPE_LIQUID,
        falldown: Falldown::Liquid,
        heat_conduct,
        gravity: 0.1,
        advection: 0.6,
        loss: 0.98,
        collision: 0.0,
        ..Default::default()
    }
}

fn gas(id: u16, name: &str, heat_conduct: u8) -> ElementDef {
    ElementDef {
        id,
        name: name.to_string(),
        weight: 1,
        properties: ElementProperties::TYPE_GAS,
        heat_conduct,
        advection: 1.0,
        loss: 0.3,
        collision: -0.1,
        ..Default::default()
    }
}

fn energy(id: u16, name: &str, heat_conduct: u8, life: i32) -> ElementDef {
    ElementDef {
        id,
        name: name.to_string(),
        weight: -1,
        properties: ElementProperties::TYPE_ENERGY
            | ElementProperties::LIFE_DEC
            | ElementProperties::LIFE_KILL_DEC,
        heat_conduct,
        loss: 1.0,
        collision: -0.99,
        default_life: life,
        ..Default::default()
    }
}

fn solid(id: u16, name: &str, heat_conduct: u8) -> ElementDef {
    ElementDef {
        id,
        name: name.to_string(),
        weight: 100,
        properties: ElementProperties::TYPE_SOLID,
        heat_conduct,
        ..Default::default()
    }
}

/// Registry of all elements, indexed by dense element id
pub struct Elements {
    elements: Vec<ElementDef>,
}

impl Elements {
    /// Registry with every built-in element
    pub fn new() -> Self {
        let mut elements = Self::empty();
        elements.register_defaults();
        log::debug!(
            "Registered {} elements ({} table slots)",
            elements.iter().count(),
            elements.len()
        );
        elements
    }

    /// Registry holding only the reserved empty element
    pub fn empty() -> Self {
        let mut elements = Self {
            elements: Vec::new(),
        };
        elements.register(ElementDef {
            id: ElementId::NONE,
            name: "NONE".to_string(),
            weight: 0,
            ..Default::default()
        });
        elements
    }

    fn register_defaults(&mut self) {
        use ElementId as E;
        use ElementProperties as P;

        // Powders
        self.register(powder(E::DUST, "DUST", 85, 70));
        self.register(powder(E::STNE, "STNE", 90, 150));
        self.register(powder(E::SAND, "SAND", 90, 150));
        self.register(powder(E::GUNP, "GUNP", 85, 97));
        self.register(powder(E::SNOW, "SNOW", 50, 46));
        self.register(powder(E::SALT, "SALT", 75, 110));
        self.register(ElementDef {
            properties: P::TYPE_PART | P::CONDUCTS,
            ..powder(E::BRMT, "BRMT", 90, 211)
        });
        self.register(ElementDef {
            properties: P::TYPE_PART | P::NEUTPASS,
            ..powder(E::BGLA, "BGLA", 90, 150)
        });
        self.register(ElementDef {
            properties: P::TYPE_PART | P::NEUTPASS | P::RADIOACTIVE,
            ..powder(E::PLUT, "PLUT", 90, 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_PART | P::RADIOACTIVE,
            ..powder(E::URAN, "URAN", 90, 251)
        });
        self.register(powder(E::CNCT, "CNCT", 55, 100));
        self.register(powder(E::BCOL, "BCOL", 90, 150));
        self.register(powder(E::DEST, "DEST", 101, 150));
        self.register(ElementDef {
            gravity: -0.1,
            ..powder(E::ANAR, "ANAR", 85, 70)
        });
        self.register(powder(E::PQRT, "PQRT", 90, 3));
        self.register(powder(E::GBMB, "GBMB", 30, 29));
        self.register(powder(E::BVBR, "BVBR", 90, 251));
        self.register(powder(E::SAWD, "SAWD", 18, 70));
        self.register(ElementDef {
            properties: P::TYPE_PART | P::LIFE_DEC | P::LIFE_KILL_DEC,
            default_life: 50,
            default_temp: R_TEMP + 500.0,
            ..powder(E::EMBR, "EMBR", 30, 29)
        });
        self.register(powder(E::RAZR, "RAZR", 90, 251));
        self.register(ElementDef {
            properties: P::TYPE_PART | P::RADIOACTIVE,
            ..powder(E::ISZS, "ISZS", 100, 251)
        });

        // Liquids
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::CONDUCTS | P::NEUTPENETRATE,
            ..liquid(E::WATR, "WATR", 30, 29)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::NEUTPENETRATE,
            ..liquid(E::DSTW, "DSTW", 30, 23)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::CONDUCTS | P::NEUTPENETRATE,
            ..liquid(E::SLTW, "SLTW", 35, 75)
        });
        self.register(liquid(E::OIL, "OIL", 20, 42));
        self.register(ElementDef {
            default_temp: R_TEMP + 1500.0,
            ..liquid(E::LAVA, "LAVA", 45, 60)
        });
        self.register(liquid(E::NITR, "NITR", 23, 50));
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::DEADLY,
            ..liquid(E::ACID, "ACID", 10, 34)
        });
        self.register(liquid(E::MWAX, "MWAX", 25, 44));
        self.register(ElementDef {
            default_temp: 70.15,
            ..liquid(E::LN2, "LN2", 30, 70)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::NEUTPENETRATE,
            ..liquid(E::DEUT, "DEUT", 31, 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::NEUTPENETRATE,
            ..liquid(E::GEL, "GEL", 35, 29)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::LIFE_DEC,
            default_temp: R_TEMP + 20.0,
            ..liquid(E::GLOW, "GLOW", 40, 44)
        });
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::RADIOACTIVE,
            ..liquid(E::ISOZ, "ISOZ", 24, 29)
        });
        self.register(liquid(E::BIZR, "BIZR", 30, 29));
        self.register(liquid(E::EXOT, "EXOT", 46, 250));
        self.register(ElementDef {
            properties: P::TYPE_LIQUID | P::CONDUCTS | P::NEUTABSORB,
            ..liquid(E::MERC, "MERC", 91, 251)
        });
        self.register(liquid(E::SOAP, "SOAP", 35, 29));

        // Gases
        self.register(gas(E::GAS, "GAS", 42));
        self.register(gas(E::WTRV, "WTRV", 48));
        self.register(ElementDef {
            weight: 2,
            properties: P::TYPE_GAS | P::LIFE_DEC | P::LIFE_KILL_DEC,
            default_life: 120,
            default_temp: R_TEMP + 400.0,
            ..gas(E::FIRE, "FIRE", 88)
        });
        self.register(ElementDef {
            properties: P::TYPE_GAS | P::LIFE_DEC,
            ..gas(E::SMKE, "SMKE", 88)
        });
        self.register(ElementDef {
            properties: P::TYPE_GAS | P::DEADLY | P::LIFE_DEC | P::LIFE_KILL_DEC,
            default_life: 50,
            default_temp: 9999.0,
            ..gas(E::PLSM, "PLSM", 5)
        });
        self.register(gas(E::H2, "H2", 251));
        self.register(gas(E::O2, "O2", 70));
        self.register(gas(E::CO2, "CO2", 88));
        self.register(gas(E::BIZRG, "BIZRG", 42));
        self.register(ElementDef {
            weight: 2,
            properties: P::TYPE_GAS | P::LIFE_DEC | P::LIFE_KILL_DEC,
            default_life: 60,
            default_temp: 100.15,
            ..gas(E::CFLM, "CFLM", 88)
        });

        // Energy particles
        self.register(ElementDef {
            default_ctype: 0x3FFF_FFFF,
            default_temp: R_TEMP + 900.0,
            ..energy(E::PHOT, "PHOT", 251, 680)
        });
        self.register(ElementDef {
            default_temp: R_TEMP + 4.0,
            ..energy(E::NEUT, "NEUT", 60, 680)
        });
        self.register(ElementDef {
            default_temp: R_TEMP + 200.0,
            ..energy(E::ELEC, "ELEC", 251, 680)
        });
        self.register(ElementDef {
            default_temp: R_TEMP + 273.0,
            ..energy(E::PROT, "PROT", 61, 75)
        });
        self.register(ElementDef {
            default_temp: R_TEMP + 200.0,
            ..energy(E::GRVT, "GRVT", 61, 250)
        });
        self.register(ElementDef {
            weight: 1,
            properties: P::TYPE_ENERGY | P::LIFE_DEC | P::LIFE_KILL_DEC,
            default_temp: 9000.0,
            ..energy(E::THDR, "THDR", 1, 10)
        });

        // Solids
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::METL, "METL", 251)
        });
        self.register(solid(E::WOOD, "WOOD", 164));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::NEUTPASS,
            ..solid(E::GLAS, "GLAS", 150)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::INDESTRUCTIBLE,
            ..solid(E::DMND, "DMND", 186)
        });
        self.register(solid(E::INSL, "INSL", 0));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::BMTL, "BMTL", 251)
        });
        self.register(solid(E::BRCK, "BRCK", 251));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::PSCN, "PSCN", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::NSCN, "NSCN", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::IRON, "IRON", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::TTAN, "TTAN", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::GOLD, "GOLD", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::TUNG, "TUNG", 251)
        });
        self.register(solid(E::QRTZ, "QRTZ", 3));
        self.register(solid(E::COAL, "COAL", 200));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::NEUTPENETRATE | P::LIFE_DEC,
            ..solid(E::PLNT, "PLNT", 65)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::NEUTPASS,
            default_temp: R_TEMP - 50.0,
            ..solid(E::ICEI, "ICEI", 46)
        });
        self.register(solid(E::WAX, "WAX", 44));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CLONE,
            ..solid(E::CLNE, "CLNE", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CLONE,
            ..solid(E::PCLN, "PCLN", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::BREAKABLECLONE,
            ..solid(E::BCLN, "BCLN", 251)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::BREAKABLECLONE,
            ..solid(E::PBCN, "PBCN", 251)
        });
        self.register(solid(E::VOID, "VOID", 251));
        self.register(solid(E::PVOD, "PVOD", 251));
        self.register(solid(E::BHOL, "BHOL", 186));
        self.register(solid(E::NBHL, "NBHL", 186));
        self.register(solid(E::WHOL, "WHOL", 255));
        self.register(solid(E::NWHL, "NWHL", 255));
        self.register(solid(E::LCRY, "LCRY", 251));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::SWCH, "SWCH", 251)
        });
        self.register(solid(E::HSWC, "HSWC", 251));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::NEUTPASS,
            ..solid(E::INVIS, "INVIS", 164)
        });
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::NEUTPASS,
            ..solid(E::PINV, "PINV", 164)
        });
        self.register(solid(E::FILT, "FILT", 251));
        self.register(ElementDef {
            default_temp: 110.0,
            ..solid(E::C5, "C5", 88)
        });
        self.register(solid(E::STOR, "STOR", 0));
        self.register(solid(E::PRTI, "PRTI", 0));
        self.register(solid(E::PRTO, "PRTO", 0));
        self.register(solid(E::PPTI, "PPTI", 0));
        self.register(solid(E::PPTO, "PPTO", 0));
        self.register(solid(E::SPNG, "SPNG", 251));
        self.register(solid(E::TRON, "TRON", 0));
        self.register(solid(E::VIBR, "VIBR", 251));
        self.register(ElementDef {
            default_life: 4,
            ..solid(E::SPRK, "SPRK", 251)
        });
        self.register(solid(E::GPMP, "GPMP", 0));
        self.register(solid(E::BIZRS, "BIZRS", 15));
        self.register(solid(E::ROCK, "ROCK", 200));
        self.register(solid(E::SPAWN, "SPAWN", 0));
        self.register(solid(E::SPAWN2, "SPAWN2", 0));
        self.register(solid(E::LOLZ, "LOLZ", 0));
        self.register(solid(E::LOVE, "LOVE", 0));
        self.register(solid(E::LIGH, "LIGH", 0));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::TESC, "TESC", 251)
        });
        self.register(solid(E::MOVS, "MOVS", 0));
        self.register(ElementDef {
            properties: P::TYPE_SOLID | P::CONDUCTS,
            ..solid(E::INST, "INST", 251)
        });
        self.register(solid(E::DTEC, "DTEC", 0));

        // Characters carry no category flags
        for (id, name) in [
            (E::STKM, "STKM"),
            (E::STKM2, "STKM2"),
            (E::FIGH, "FIGH"),
        ] {
            self.register(ElementDef {
                id,
                name: name.to_string(),
                weight: 50,
                advection: 0.5,
                loss: 1.0,
                default_life: 100,
                default_temp: R_TEMP + 14.6,
                ..Default::default()
            });
        }
    }

    /// Register (or replace) an element definition
    pub fn register(&mut self, mut element: ElementDef) {
        let id = element.id as usize;

        if self.elements.len() <= id {
            self.elements.resize(id + 1, ElementDef::default());
        }

        element.enabled = true;
        self.elements[id] = element;
    }

    /// Get element definition by ID (falls back to NONE for unknown ids)
    pub fn get(&self, id: u16) -> &ElementDef {
        self.elements
            .get(id as usize)
            .unwrap_or(&self.elements[0])
    }

    /// Number of table slots (highest id + 1)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    /// True for registered ids, including NONE
    pub fn contains(&self, id: u16) -> bool {
        self.elements
            .get(id as usize)
            .is_some_and(|element| element.enabled)
    }

    /// True for registered, non-empty element ids
    pub fn is_element(&self, id: i32) -> bool {
        u16::try_from(id).is_ok_and(|id| id != ElementId::NONE && self.contains(id))
    }

    /// Look up an element id by name
    pub fn by_name(&self, name: &str) -> Option<u16> {
        self.iter()
            .find(|element| element.name.eq_ignore_ascii_case(name))
            .map(|element| element.id)
    }

    /// Iterate over registered elements
    pub fn iter(&self) -> impl Iterator<Item = &ElementDef> {
        self.elements.iter().filter(|element| element.enabled)
    }
}

impl Default for Elements {
    fn default() -> Self {
        Self::new()
    }
}
