//! Standard catalog tables.

use world_level_core::{Boss, EntityId};

use crate::{BossDefinition, EnemyCategory, VariantGroup};

pub(crate) fn bosses() -> Vec<BossDefinition> {
    let table: [(Boss, u32, &[i32], &str, &str); 18] = [
        (Boss::KingSlime, 1, &[50], "Surface Hunt", "Defeat slime enemies"),
        (Boss::EyeOfCthulhu, 1, &[4], "Night Watch", "Defeat flying enemies"),
        (
            Boss::EaterOfWorlds,
            2,
            &[13, 14, 15],
            "Corruption Hunt",
            "Defeat corruption enemies",
        ),
        (
            Boss::BrainOfCthulhu,
            2,
            &[266],
            "Crimson Hunt",
            "Defeat crimson enemies",
        ),
        (Boss::QueenBee, 3, &[222], "Jungle Hunt", "Defeat jungle enemies"),
        (Boss::Deerclops, 3, &[668], "Snow Hunt", "Defeat snow biome enemies"),
        (Boss::Skeletron, 4, &[35], "Dungeon Hunt", "Defeat dungeon enemies"),
        (Boss::WallOfFlesh, 5, &[113], "Hell Hunt", "Defeat underworld enemies"),
        (Boss::QueenSlime, 6, &[657], "Hallow Hunt", "Defeat hallowed enemies"),
        (Boss::TheDestroyer, 7, &[134], "Mech Hunt", "Defeat mechanical enemies"),
        (
            Boss::TheTwins,
            7,
            &[125, 126],
            "Vision Hunt",
            "Defeat mechanical eye enemies",
        ),
        (Boss::SkeletronPrime, 7, &[127], "Prime Hunt", "Defeat construct enemies"),
        (Boss::Plantera, 8, &[262], "Plant Hunt", "Defeat plant enemies"),
        (Boss::Golem, 9, &[245], "Temple Hunt", "Defeat temple enemies"),
        (Boss::DukeFishron, 10, &[370], "Ocean Hunt", "Defeat ocean enemies"),
        (Boss::EmpressOfLight, 10, &[636], "Light Hunt", "Defeat fairy enemies"),
        (Boss::LunaticCultist, 11, &[439], "Cultist Hunt", "Defeat cultist enemies"),
        (Boss::MoonLord, 12, &[398], "Celestial Hunt", "Defeat lunar enemies"),
    ];

    table
        .into_iter()
        .map(|(boss, level, components, title, objective)| {
            BossDefinition::new(
                boss,
                level,
                level >= HARDMODE_LEVEL,
                components.iter().copied().map(EntityId::new).collect(),
                title,
                objective,
            )
        })
        .collect()
}

const HARDMODE_LEVEL: u32 = 6;

pub(crate) fn categories() -> Vec<EnemyCategory> {
    vec![
        EnemyCategory::new(
            "Forest/Surface",
            false,
            [
                1, 2, -43, 190, -38, 191, -39, 192, -40, 193, -41, 194, -42, 624, 73, -3, 632, 23,
                -4, -7, 301, -8, 3, -26, -27, 430, 132, -28, -29, 186, -30, -31, 187, -32, -33,
                188, -34, -35, 189, -36, -37, 200, -44, -45, 590,
            ],
            [Boss::KingSlime, Boss::EyeOfCthulhu],
            1.2,
        ),
        EnemyCategory::new(
            "Desert",
            false,
            [69, 582, 580, 508, 581, 509, 537, 513, 61],
            [Boss::KingSlime, Boss::EyeOfCthulhu],
            1.4,
        ),
        EnemyCategory::new("Corruption", false, [7, 6, -11, -12], [Boss::EaterOfWorlds], 1.8),
        EnemyCategory::new(
            "Crimson",
            false,
            [239, 240, 173, -22, -23, 181],
            [Boss::BrainOfCthulhu],
            1.8,
        ),
        EnemyCategory::new(
            "Snow",
            false,
            [218, 52, 161, 431, 150, 147, 185, 184, 167],
            [Boss::Deerclops],
            1.3,
        ),
        EnemyCategory::new(
            "Jungle",
            false,
            [
                210, 211, 42, -16, -17, 231, -56, -57, 232, -58, -59, 233, -60, -61, 234, -62, -63,
                235, -64, -65, 51, -10, 219, 43, 58, 56, 204,
            ],
            [Boss::QueenBee],
            1.7,
        ),
        EnemyCategory::new(
            "Mushroom",
            false,
            [257, 259, 258, 634, 635, 254, 255],
            [Boss::QueenBee],
            1.3,
        ),
        EnemyCategory::new("Ocean", false, [64, 67, 65], [Boss::Skeletron], 1.3),
        EnemyCategory::new(
            "Caverns",
            false,
            [
                -5, -6, 63, 49, 217, 494, 495, 316, 496, 497, 10, 483, 482, 481, 16, 196, 498, 499,
                500, 501, 502, 503, 504, 505, 506, 676, 471, 44, 164, -9,
            ],
            [Boss::Skeletron],
            1.5,
        ),
        EnemyCategory::new("Floating Island", false, [48], [Boss::Skeletron], 1.4),
        EnemyCategory::new(
            "Dungeon",
            false,
            [31, -13, -14, 294, 295, 296, 34, 32, 71],
            [Boss::WallOfFlesh],
            2.0,
        ),
        EnemyCategory::new(
            "Underworld",
            false,
            [39, 62, 24, 60, 59, 66],
            [Boss::WallOfFlesh],
            2.1,
        ),
        EnemyCategory::new(
            "Early Hardmode",
            true,
            [
                532, 163, 241, 242, 530, 101, 81, 94, 183, 79, 533, 182, 256, 122, 140, 82, 104,
            ],
            [Boss::QueenSlime],
            2.2,
        ),
        EnemyCategory::new(
            "Mechanical",
            true,
            [77, 197, 273, 287, 473, 474, 475, 179, 83, 84, 525, 526, 527],
            [Boss::TheDestroyer, Boss::TheTwins, Boss::SkeletronPrime],
            2.6,
        ),
        EnemyCategory::new(
            "Underground Jungle",
            true,
            [205, 153, 175, 177, 236, 152, 176, 157, 102, 225],
            [Boss::Plantera],
            2.9,
        ),
        EnemyCategory::new(
            "Hallow",
            true,
            [120, 137, 138, 80, 75, 86],
            [Boss::DukeFishron, Boss::EmpressOfLight],
            2.3,
        ),
        EnemyCategory::new(
            "Temple",
            true,
            [
                226, 199, 198, 533, 292, 291, 269, 293, 631, 156, 478, 460, 467, 489, 463, 251, 162,
                468, 469, 466, 253, 166, 461, 158, 329, 330, 326,
            ],
            [Boss::Golem],
            3.0,
        ),
        EnemyCategory::new(
            "Celestial",
            true,
            [
                381, 388, 385, 386, 383, 520, 382, 390, 391, 387, 427, 421, 423, 420, 412, 415,
                416, 417, 418, 419, 424, 425, 426, 428, 429, 402, 405, 407, 409,
            ],
            [Boss::MoonLord],
            3.2,
        ),
    ]
}

pub(crate) fn variant_groups() -> Vec<VariantGroup> {
    vec![
        VariantGroup::new("Slimes", [1, -3, -4, -5, -6, -7, -8, -9, -10, 16, 59, 147, 184]),
        VariantGroup::new(
            "Demon Eyes",
            [2, -43, 190, -38, 191, -39, 192, -40, 193, -41, 194, -42],
        ),
        VariantGroup::new(
            "Zombies",
            [
                3, -26, -27, 132, -28, -29, 186, -30, -31, 187, -32, -33, 188, -34, -35, 189, -36,
                -37, 200, -44, -45, 430, 590,
            ],
        ),
        VariantGroup::new("Eaters of Souls", [6, -11, -12]),
        VariantGroup::new("Crimeras", [173, -22, -23]),
        VariantGroup::new(
            "Hornets",
            [
                42, -16, -17, 231, -56, -57, 232, -58, -59, 233, -60, -61, 234, -62, -63, 235, -64,
                -65,
            ],
        ),
        VariantGroup::new("Angry Bones", [31, -13, -14, 294, 295, 296]),
        VariantGroup::new("Mushroom Zombies", [254, 255]),
        VariantGroup::new("Mummies", [79, 80]),
        VariantGroup::new("Desert Ghouls", [525, 526, 527]),
        VariantGroup::new("Big Mimics", [473, 474, 475]),
    ]
}
