// src/enrich/keywords.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword matched as a plain substring so that plurals and compounds
/// ("Percussions", "BodyPercussion") still classify.
const SUBSTRING_KEYWORD: &str = "percussion";

/// Process-wide classifier over [`KEYWORD_TABLE`].
pub static CLASSIFIER: Lazy<KeywordClassifier> = Lazy::new(|| {
    KeywordClassifier::new(KEYWORD_TABLE).expect("static keyword table must compile")
});

/// Classify formatted stem text with the built-in keyword table.
pub fn classify(stem_text: &str) -> Option<&'static str> {
    CLASSIFIER.classify(stem_text)
}

enum Matcher {
    Substring,
    WholeWord(Regex),
}

struct KeywordRule {
    keyword: &'static str,
    category: &'static str,
    matcher: Matcher,
}

/// Longest-keyword-first instrumentation classifier.
///
/// Rules are ordered by keyword length (in characters), longest first; equal
/// lengths keep table order. The first rule that matches decides the category.
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    pub fn new(table: &[(&'static str, &'static str)]) -> Result<Self> {
        let mut rules = table
            .iter()
            .map(|&(keyword, category)| {
                let keyword_lower = keyword.to_lowercase();
                let matcher = if keyword_lower == SUBSTRING_KEYWORD {
                    Matcher::Substring
                } else {
                    let pattern = format!(r"\b{}\b", regex::escape(&keyword_lower));
                    Matcher::WholeWord(
                        Regex::new(&pattern)
                            .with_context(|| format!("compiling keyword `{}`", keyword))?,
                    )
                };
                Ok(KeywordRule {
                    keyword,
                    category,
                    matcher,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // stable: ties keep table order
        rules.sort_by_key(|r| std::cmp::Reverse(r.keyword.chars().count()));
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category of the first (longest) matching keyword, if any.
    pub fn classify(&self, stem_text: &str) -> Option<&'static str> {
        let text = stem_text.to_lowercase();
        if text.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| match &rule.matcher {
                Matcher::Substring => text.contains(&rule.keyword.to_lowercase()),
                Matcher::WholeWord(re) => re.is_match(&text),
            })
            .map(|rule| rule.category)
    }
}

/// Lowercase keyword → canonical instrumentation category.
pub static KEYWORD_TABLE: &[(&str, &str)] = &[
    ("accordion", "Accordion"),
    ("alpenhorn", "Alpenhorn/Alpine Horn"),
    ("alpine horn", "Alpenhorn/Alpine Horn"),
    ("autoharp", "Autoharp"),
    ("bagpipes", "Bagpipes"),
    ("bajo sexto", "Bajo Sexto"),
    ("balafon", "Balafon"),
    ("balalaika", "Balalaika"),
    ("bandoneon", "Bandoneon"),
    ("bandura", "Bandura"),
    ("banjo", "Banjo"),
    ("bansuri", "Bansuri/Baanhi/Baashi/Bansi/Basari"),
    ("baanhi", "Bansuri/Baanhi/Baashi/Bansi/Basari"),
    ("baashi", "Bansuri/Baanhi/Baashi/Bansi/Basari"),
    ("bansi", "Bansuri/Baanhi/Baashi/Bansi/Basari"),
    ("basari", "Bansuri/Baanhi/Baashi/Bansi/Basari"),
    ("bass", "Bass"),
    ("bass drum", "Bass Drum"),
    ("bassoon", "Bassoon"),
    ("batacada", "Batacada"),
    ("bawu", "Bawu"),
    ("bell tree", "Bell Tree"),
    ("bells", "Bells"),
    ("berimbau", "Berimbau"),
    ("big band", "Big Band"),
    ("bladder pipe", "Bladder Pipe"),
    ("bodhran", "Bodhran/Frame Drum"),
    ("frame drum", "Bodhran/Frame Drum"),
    ("bombard", "Bombard"),
    ("bombo", "Bombo"),
    ("bones", "Bones"),
    ("bongos", "Bongos"),
    ("bottle", "Bottle"),
    ("bouzouki", "Bouzouki"),
    ("bow", "Bow"),
    ("brass", "Brass"),
    ("bugle", "Bugle"),
    ("bullroarer", "Bullroarer/Rhombus"),
    ("rhombus", "Bullroarer/Rhombus"),
    ("cabasa", "Cabasa"),
    ("calliope", "Calliope"),
    ("carillon", "Carillon"),
    ("castanets", "Castanets"),
    ("cavaquinho", "Cavaquinho"),
    ("celeste", "Celeste"),
    ("cello", "Cello"),
    ("chapman stick", "Chapman Stick"),
    ("charango", "Charango"),
    ("chekere", "Chekere/Djabara"),
    ("djabara", "Chekere/Djabara"),
    ("chimes", "Chimes/Tubular Bells"),
    ("tubular bells", "Chimes/Tubular Bells"),
    ("cimbalom", "Cimbalom"),
    ("cittern", "Cittern"),
    ("clarinet", "Clarinet"),
    ("clarsach", "Clarsach"),
    ("claves", "Claves"),
    ("clavinet", "Clavinet"),
    ("coconuts", "Coconuts"),
    ("comb and paper", "Comb And Paper"),
    ("concertina", "Concertina"),
    ("conch shell", "Conch Shell"),
    ("congas", "Congas"),
    ("cor anglais", "Cor Anglais/English Horn"),
    ("english horn", "Cor Anglais/English Horn"),
    ("cornamuse", "Cornamuse"),
    ("cornet", "Cornet"),
    ("cornett", "Cornett"),
    ("cowbell", "Cowbell"),
    ("crotales", "Crotales"),
    ("crowth", "Crowth"),
    ("crumhorn", "Crumhorn"),
    ("cuatro", "Cuatro"),
    ("cuica", "Cuica"),
    ("cymbals", "Cymbals"),
    ("da suo", "Da Suo"),
    ("daf", "Daf/Dayereh"),
    ("dayereh", "Daf/Dayereh"),
    ("dan bau", "Dan Bau"),
    ("darbouka", "Darbouka"),
    ("def", "Def"),
    ("descant fiddle", "Descant Fiddle"),
    ("dhol", "Dhol"),
    ("dholak", "Dholak"),
    ("didgeridoo", "Didgeridoo"),
    ("dilruba", "Dilruba"),
    ("dizi", "Dizi"),
    ("djembe", "Djembe"),
    ("dolceola", "Dolceola"),
    ("double bass", "Double Bass"),
    ("doumbek/dumbek", "Doumbek/Dumbek"),
    ("doumbek", "Doumbek/Dumbek"),
    ("dumbek", "Doumbek/Dumbek"),
    ("drone", "Drone"),
    ("drum kit", "Drum Kit"),
    ("drum machine", "Drum Machine/Electronic Drums"),
    ("electronic drums", "Drum Machine/Electronic Drums"),
    ("drum set", "Drum Set"),
    ("drums", "Drums"),
    ("duck call", "Duck Call"),
    ("dudak", "Dudak"),
    ("dudu", "Dudu"),
    ("duduk", "Duduk"),
    ("duff", "Duff"),
    ("dulcimer", "Dulcimer"),
    ("dulcitone", "Dulcitone"),
    ("dunun", "Dunun"),
    ("electronic instruments", "Electronic Instruments"),
    ("electronics", "Electronics"),
    ("erhu", "Erhu"),
    ("esraj", "Esraj"),
    ("ethnic plucked instruments", "Ethnic Plucked Instruments"),
    ("ethnic string instruments", "Ethnic String Instruments"),
    ("ethnic wind instruments", "Ethnic Wind Instruments"),
    ("fiddle", "Fiddle"),
    ("fife", "Fife"),
    ("finger bells", "Finger Cymbals/Finger Bells"),
    ("finger cymbals", "Finger Cymbals/Finger Bells"),
    ("finger snaps", "Finger Snaps"),
    ("flapamba", "Flapamba"),
    ("flexatone", "Flexatone"),
    ("flugelhorn", "Flugelhorn"),
    ("flute", "Flute"),
    ("fue", "Fue"),
    ("gambang", "Gambang"),
    ("gamelan", "Gamelan"),
    ("gemshorn", "Gemshorn"),
    ("ghaychak", "Ghaychak"),
    ("ghurzen", "Ghurzen"),
    ("glockenspiel", "Glockenspiel"),
    ("goblet drum", "Goblet Drum/Dumbec"),
    ("dumbec", "Goblet Drum/Dumbec"),
    ("gong", "Gong"),
    ("gong - chinese", "Gong - Chinese/Chau"),
    ("chau", "Gong - Chinese/Chau"),
    ("gran cassa", "Gran Cassa"),
    ("guiro", "Guiro"),
    ("acoustic guitars", "Guitar - Acoustic/Steel String"),
    ("acoustic guitar", "Guitar - Acoustic/Steel String"),
    ("guitar acoustic", "Guitar - Acoustic/Steel String"),
    ("guitars acoustic", "Guitar - Acoustic/Steel String"),
    ("guitar - acoustic", "Guitar - Acoustic/Steel String"),
    ("guitar - distorted electric", "Guitar - Distorted Electric"),
    ("dobro", "Guitar - Dobro"),
    ("e-bow", "Guitar - E-Bow"),
    ("electric guitars", "Guitar - Electric"),
    ("electric guitar", "Guitar - Electric"),
    ("guitars electric", "Guitar - Electric"),
    ("guitar electric", "Guitar - Electric"),
    ("guitar - electric", "Guitar - Electric"),
    ("pedal steel", "Guitar - Pedal Steel"),
    ("guitarron", "Guitarron"),
    ("guqin", "Guqin"),
    ("guzheng", "Guzheng"),
    ("hammered dulcimer", "Hammered Dulcimer"),
    ("hand claps", "Hand Claps"),
    ("hang drum", "Hang Drum"),
    ("harmonica", "Harmonica"),
    ("harmonium", "Harmonium"),
    ("harp", "Harp"),
    ("harpsichord", "Harpsichord"),
    ("hi-hat", "Hi-Hat"),
    ("hi hat", "Hi-Hat"),
    ("hihat", "Hi-Hat"),
    ("hichiriki", "Hichiriki"),
    ("horn", "Horn"),
    ("french horn", "Horn - French"),
    ("horns", "Horns/Horn Section"),
    ("hurdy gurdy", "Hurdy Gurdy"),
    ("jazz trio", "Jazz Trio"),
    ("jug", "Jug"),
    ("kalimba/sanza", "Kalimba/Sanza"),
    ("kalimba", "Kalimba/Sanza"),
    ("sanza", "Kalimba/Sanza"),
    ("kamancheh", "Kamancheh/Kamanche/Kamancha"),
    ("kamanche", "Kamancheh/Kamanche/Kamancha"),
    ("kamancha", "Kamancheh/Kamanche/Kamancha"),
    ("kanun", "Kanun"),
    ("kaval", "Kaval"),
    ("kawala", "Kawala/Salamiya"),
    ("salamiya", "Kawala/Salamiya"),
    ("kazoo", "Kazoo"),
    ("kecapi", "Kecapi"),
    ("keyboard", "Keyboard"),
    ("keys", "Keyboard"),
    ("khene", "Khene"),
    ("khlui", "Khlui"),
    ("koboz", "Koboz"),
    ("kokyu", "Kokyu"),
    ("kora", "Kora"),
    ("kortholt", "Kortholt"),
    ("koto", "Koto"),
    ("llamas hooves", "Llamas Hooves"),
    ("log drum", "Log Drum"),
    ("lute", "Lute"),
    ("lyre", "Lyre"),
    ("mallet", "Mallet"),
    ("mandira", "Mandira"),
    ("mandocello", "Mandocello"),
    ("mandola", "Mandola"),
    ("mandolin", "Mandolin"),
    ("maracas", "Maracas"),
    ("marimba", "Marimba"),
    ("marimbula", "Marimbula"),
    ("matou qin/morin khuur/horsehead fiddle", "MaTou Qin/Morin Khuur/Horsehead Fiddle"),
    ("mbira", "Mbira/African Thumb Piano"),
    ("african thumb piano", "Mbira/African Thumb Piano"),
    ("mellophone", "Mellophone"),
    ("mellotron", "Mellotron"),
    ("melodeon", "Melodeon"),
    ("melodica", "Melodica"),
    ("mizmar", "Mizmar"),
    ("morin khuur", "Morin Khuur"),
    ("mouth harp", "Mouth Harp/Jews Harp"),
    ("jews harp", "Mouth Harp/Jews Harp"),
    ("mouth", "Mouth/Beat Box"),
    ("beat box", "Mouth/Beat Box"),
    ("mridangam", "Mridangam"),
    ("mukkuri", "Mukkuri/Tonkori"),
    ("tonkori", "Mukkuri/Tonkori"),
    ("musette", "Musette"),
    ("music box", "Music Box"),
    ("musical saw", "Musical Saw"),
    ("ney", "Ney"),
    ("ngoni", "Ngoni"),
    ("non-specific", "Non-specific"),
    ("novachord", "Novachord"),
    ("oboe", "Oboe"),
    ("ocarina", "Ocarina"),
    ("omnichord", "Omnichord"),
    ("orchestra", "Orchestra"),
    ("organ", "Organ"),
    ("wurlitzer", "Organ - Wurlitzer"),
    ("oud", "Oud"),
    ("pads", "Pads"),
    ("palm court", "Palm Court/Salon Orchestra"),
    ("pan pipes", "Pan Pipes"),
    ("percussion", "Percussion"),
    ("piano", "Piano"),
    ("pipa", "Pipa"),
    ("pipes", "Pipes"),
    ("pipes - celtic", "Pipes - Celtic"),
    ("pipes - hornpipe", "Pipes - Hornpipe"),
    ("pipes - pan", "Pipes - Pan"),
    ("polyphone", "Polyphone"),
    ("quena", "Quena"),
    ("rabbi", "Rabbi"),
    ("rackett", "Rackett"),
    ("rainstick", "Rainstick"),
    ("ranat", "Ranat"),
    ("ratchet", "Ratchet"),
    ("rebec", "Rebec"),
    ("recorder", "Recorder"),
    ("reed aerophone", "Reed Aerophone"),
    ("riq", "Riq/Kanjira"),
    ("kanjira", "Riq/Kanjira"),
    ("rubab", "Rubab/Robab/Rabab"),
    ("robab", "Rubab/Robab/Rabab"),
    ("rabab", "Rubab/Robab/Rabab"),
    ("sackbut", "Sackbut"),
    ("sanshin", "Sanshin"),
    ("santoor", "Santoor"),
    ("sarangi", "Sarangi"),
    ("sarod", "Sarod"),
    ("saunter", "Saunter"),
    ("saxophone", "Saxophone"),
    ("saz lute", "Saz Lute/Baglama"),
    ("baglama", "Saz Lute/Baglama"),
    ("scheitholt", "Scheitholt"),
    ("scratching", "Scratching"),
    ("sfx", "SFX (Sound Effects)"),
    ("effects", "SFX (Sound Effects)"),
    ("shaker", "Shaker"),
    ("shakuhachi", "Shakuhachi"),
    ("shamisen", "Shamisen"),
    ("shawm", "Shawm"),
    ("shekere", "Shekere"),
    ("shenai", "Shenai"),
    ("sho", "Sho"),
    ("shou", "Shou"),
    ("side drum", "Side Drum"),
    ("singing bowls", "Singing Bowls"),
    ("sitar", "Sitar"),
    ("snare drum", "Snare Drum"),
    ("sound design", "Sound Design"),
    ("spoons", "Spoons"),
    ("steel drums", "Steel Drums"),
    ("steelpan", "Steelpan"),
    ("sticks", "Sticks"),
    ("string ensemble", "String Ensemble"),
    ("string quartet", "String Quartet"),
    ("string section", "String Section"),
    ("strings", "Strings"),
    ("suling", "Suling"),
    ("suona", "Suona"),
    ("surbahar", "Surbahar"),
    ("surdo", "Surdo"),
    ("synthesizer", "Synthesizer"),
    ("synth", "Synthesizer"),
    ("synths", "Synthesizer"),
    ("tabla", "Tabla"),
    ("taiko drum", "Taiko Drum"),
    ("talking drum", "Talking Drum"),
    ("tambourine", "Tambourine"),
    ("tambura", "Tambura"),
    ("tar", "Tar"),
    ("tarabuka", "Tarabuka"),
    ("temple bell", "Temple Bell"),
    ("temple blocks", "Temple Blocks"),
    ("theremin", "Theremin"),
    ("thunder sheet", "Thunder Sheet"),
    ("tibetan singing bowls", "Tibetan Singing Bowls"),
    ("timbale", "Timbale"),
    ("timpani", "Timpani"),
    ("tiompan", "Tiompan"),
    ("tom toms", "Tom Toms"),
    ("toms", "Tom Toms"),
    ("tongue drum", "Tongue Drum"),
    ("toy instruments", "Toy Instruments"),
    ("transverse flute", "Transverse Flute"),
    ("trautonium", "Trautonium"),
    ("triangle", "Triangle"),
    ("tromba marina", "Tromba Marina"),
    ("trombone", "Trombone"),
    ("trumpet", "Trumpet"),
    ("tuba", "Tuba"),
    ("udu", "Udu"),
    ("ukulele", "Ukulele"),
    ("vibraphone", "Vibraphone"),
    ("vibraslap", "Vibraslap"),
    ("viol", "Viol"),
    ("viola", "Viola"),
    ("viola da gamba", "Viola Da Gamba"),
    ("violin", "Violin"),
    ("vox", "Vocals"),
    ("vocal", "Vocals"),
    ("vocals", "Vocals"),
    ("vocoder", "Vocoder"),
    ("washboard", "Washboard"),
    ("waterphone", "Waterphone"),
    ("whip", "Whip"),
    ("whisper", "Whisper"),
    ("whistle", "Whistle"),
    ("wind chimes", "Wind Chimes"),
    ("wood block", "Wood Block"),
    ("woodblock", "Wood Block"),
    ("woodwinds", "Woodwinds"),
    ("xiao", "Xiao"),
    ("xylophone", "Xylophone"),
    ("yangqin", "Yangqin"),
    ("zagat", "Zagat"),
    ("zither", "Zither"),
    ("zourna/sorna/zurna", "Zourna/Sorna/Zurna"),
    ("sorna", "Zourna/Sorna/Zurna"),
    ("zurna", "Zourna/Sorna/Zurna"),
];
