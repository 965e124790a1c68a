//! 質問セット
//!
//! ボード1枚分（25マス）の固定質問。新しいゲームではシャッフルして配置する。

/// ビンゴの質問（ドイツ語、25個）
pub const ALL_PROMPTS: [&str; 25] = [
    "Hat Kinder",
    "Hat ein Haustier",
    "Spielt ein Instrument",
    "Fährt Fahrrad zur Arbeit",
    "Trinkt keinen Kaffee",
    "Spricht 3+ Sprachen",
    "Hat einen Garten",
    "Macht Yoga",
    "Kocht gerne",
    "Ist Linkshänder",
    "Trägt eine Brille",
    "Hat im Ausland gelebt",
    "Spielt Fußball",
    "Ist Vegetarier/Vegan",
    "Hat Geschwister",
    "Kann ein Lied singen",
    "Liebt Horrorfilme",
    "Sammelt etwas",
    "Hat ein Tattoo",
    "Liest gerne Bücher",
    "Läuft Marathon",
    "Spielt Videospiele",
    "Kann tanzen",
    "Backt gerne",
    "Ist im selben Monat geboren",
];
