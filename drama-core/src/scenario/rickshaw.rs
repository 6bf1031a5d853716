//! "The Rickshaw Accident": a rush-hour collision on Shahrah-e-Faisal.

use super::{CharacterSeed, PropOverride, PropSeed, Scenario, ScriptedEvent, SeedStory};
use crate::memory::KnowledgeGrant;
use crate::mystery::{ClueGrants, ClueSet, HiddenTruth};
use crate::plot_clock::{Phase, Pressure, TurnRange};
use crate::registry::EntityPatch;
use crate::story::SocialRole;
use lazy_static::lazy_static;
use std::collections::BTreeMap;

const SALEEM: &str = "Saleem";
const AHMED: &str = "Ahmed Malik";
const RAZA: &str = "Constable Raza";
const JAMEEL: &str = "Uncle Jameel";

lazy_static! {
    pub(super) static ref RICKSHAW_ACCIDENT: Scenario = build();
}

fn s(text: &str) -> String {
    text.to_string()
}

fn mandates(entries: [(&str, &str); 4]) -> BTreeMap<String, String> {
    entries.into_iter().map(|(k, v)| (s(k), s(v))).collect()
}

fn grants(entries: &[(&str, &str)]) -> Vec<KnowledgeGrant> {
    entries
        .iter()
        .map(|(character, token)| KnowledgeGrant::new(*character, *token))
        .collect()
}

fn clue_set(hint: &str, evidence: &str, weapon: &str) -> ClueSet {
    ClueSet {
        hint: s(hint),
        evidence: s(evidence),
        weapon: s(weapon),
    }
}

fn build() -> Scenario {
    Scenario {
        seed: SeedStory {
            title: s("The Rickshaw Accident"),
            description: s(
                "Evening rush hour on Shahrah-e-Faisal, Karachi. Saleem's rickshaw and \
                 Ahmed Malik's Corolla have collided at a chaotic intersection. Ahmed is late \
                 for a flight, Saleem says his wallet with the day's fifty thousand rupees is \
                 gone, Constable Raza has arrived sensing an opportunity, and Uncle Jameel has \
                 come out of his chai stall to watch.",
            ),
        },
        characters: characters(),
        phases: phases(),
        action_templates: action_templates(),
        interventions: interventions(),
        turning_points: turning_points(),
        clues: clues(),
        clue_grants: clue_grants(),
        reveals: reveals(),
        fallback_reveal: s(
            "The scene dissolved into the chaos of Karachi rush hour. \
             Ahmed drove off toward the airport, unlikely to catch his flight. \
             Saleem sat in his damaged rickshaw, calculating the cost of repairs. \
             Constable Raza pocketed his citation book, unsatisfied. \
             The crowd dispersed, and traffic swallowed them all.",
        ),
        codas: BTreeMap::from([
            (
                s("airline_call"),
                s("Ahmed had already missed his flight; the gate had closed three minutes before the wallet fell."),
            ),
            (
                s("crowd_recording"),
                s("The footage was already uploading to three different social media platforms."),
            ),
            (
                s("dashcam_revealed"),
                s("The dashcam video was clear and undeniable, time-stamped and geotagged."),
            ),
        ]),
        props: props(),
        prop_overrides: BTreeMap::from([
            (
                HiddenTruth::WalletNeverStolen,
                vec![PropOverride {
                    name: s("wallet"),
                    patch: EntityPatch::status("in_rickshaw").with("last_seen", "wedged beneath the rickshaw seat"),
                }],
            ),
            (
                HiddenTruth::AhmedStoleWallet,
                vec![PropOverride {
                    name: s("wallet"),
                    patch: EntityPatch::status("in_ahmed_briefcase").with("last_seen", "inside Ahmed's briefcase"),
                }],
            ),
        ]),
    }
}

fn characters() -> Vec<CharacterSeed> {
    vec![
        CharacterSeed {
            name: s(SALEEM),
            description: s(
                "Rickshaw driver, mid-forties, supports a family of six on daily fares. \
                 Speaks a Urdu and Sindhi mix. Proud, frightened of losing the rickshaw.",
            ),
            role: SocialRole::LowStatus,
            inventory: vec![s("crumpled license"), s("rickshaw keys")],
            initial_trust: BTreeMap::new(),
            initial_suspicion: BTreeMap::new(),
        },
        CharacterSeed {
            name: s(AHMED),
            description: s(
                "Corporate manager in a pressed suit, formal English, late for a flight to \
                 Dubai. Used to getting his way and quick to threaten lawyers.",
            ),
            role: SocialRole::Ordinary,
            inventory: vec![s("expensive phone"), s("business cards"), s("briefcase")],
            initial_trust: BTreeMap::new(),
            initial_suspicion: BTreeMap::new(),
        },
        CharacterSeed {
            name: s(RAZA),
            description: s(
                "Traffic constable with a clipped official tone. Underpaid, watchful, and \
                 always weighing whether a situation can be made profitable.",
            ),
            role: SocialRole::Authority,
            inventory: vec![s("citation book"), s("flashlight")],
            initial_trust: BTreeMap::new(),
            initial_suspicion: BTreeMap::new(),
        },
        CharacterSeed {
            name: s(JAMEEL),
            description: s(
                "Owner of the chai stall on the corner. Folksy, gossipy, knows everyone on \
                 the street and distrusts the police.",
            ),
            role: SocialRole::Ordinary,
            inventory: vec![s("phone"), s("thermos of chai")],
            initial_trust: BTreeMap::new(),
            initial_suspicion: BTreeMap::new(),
        },
    ]
}

fn phases() -> Vec<Phase> {
    vec![
        Phase {
            name: s("escalation"),
            turns: TurnRange::new(1, 5),
            goal: s("Establish the accident scene. All characters introduced. Friction and accusations begin. NO resolution yet."),
            pressure: Pressure::Low,
            speaker_mandates: mandates([
                (SALEEM, "Establish innocence. Invoke family and livelihood. Deny fault."),
                (AHMED, "Assert status. Invoke flight urgency. Demand accountability."),
                (RAZA, "Establish authority. Size up the bribe opportunity. Stay ambiguous."),
                (JAMEEL, "Insert himself. Pick a side (Saleem's). Offer unsolicited mediation."),
            ]),
        },
        Phase {
            name: s("complexity"),
            turns: TurnRange::new(6, 16),
            goal: s("Sides harden. Bribe negotiation begins. Actions complicate the scene. Mystery clues start dropping."),
            pressure: Pressure::High,
            speaker_mandates: mandates([
                (SALEEM, "React to specific accusations. Show desperation. Reveal new evidence or detail."),
                (AHMED, "Escalate legal threats. React to Raza's bribe signal. Contradict himself under pressure."),
                (RAZA, "Negotiate openly. Pressure the weaker party (Saleem). Reveal corrupt intent."),
                (JAMEEL, "Drop clues. Threaten to expose Raza. Shift power dynamics."),
            ]),
        },
        Phase {
            name: s("resolution"),
            turns: TurnRange::open(17),
            goal: s("Force an outcome. Someone concedes, flees, or is exposed. The mystery truth drives the ending."),
            pressure: Pressure::Critical,
            speaker_mandates: mandates([
                (SALEEM, "Use the mystery clue if it favours you. Accept or reject the bribe outcome."),
                (AHMED, "Face the consequences of your escalation. Concede, flee, or double down."),
                (RAZA, "Bribe succeeds or collapses. React to any witnesses or superior officers."),
                (JAMEEL, "Deploy the weapon clue. Force the decisive moment."),
            ]),
        },
    ]
}

fn action_templates() -> BTreeMap<String, Vec<String>> {
    let entry = |name: &str, actions: [&str; 6]| -> (String, Vec<String>) {
        (s(name), actions.iter().map(|a| s(a)).collect())
    };
    BTreeMap::from([
        entry(
            SALEEM,
            [
                "pulls out crumpled license from pocket to prove identity",
                "frantically searches rickshaw for registration papers",
                "shows Ahmed the worn brake pedal explaining mechanical issues",
                "calls his wife on phone in panic about losing day's earnings",
                "points to tyre marks on road showing where impact happened",
                "opens rickshaw hood revealing engine damage from collision",
            ],
        ),
        entry(
            AHMED,
            [
                "aggressively inspects car damage while photographing with expensive phone",
                "pulls out business card threatening legal action",
                "checks watch repeatedly muttering about flight time",
                "demands to see Saleem's papers while recording on phone",
                "calls someone, possibly a lawyer or police contact",
                "points to paint scratch insisting on immediate compensation",
            ],
        ),
        entry(
            RAZA,
            [
                "pulls out citation book flipping through pages slowly",
                "walks around vehicles examining damage with flashlight",
                "signals other officers to redirect traffic",
                "suggests moving to side while hinting at facilitation fee",
                "lowers voice and speaks to Ahmed privately away from crowd",
                "ostentatiously writes in notebook while watching Saleem",
            ],
        ),
        entry(
            JAMEEL,
            [
                "steps between arguing parties waving hands dramatically",
                "points to scratch marks claiming he saw everything",
                "offers chai from his shop to calm everyone down",
                "pulls Raza aside whispering about proper procedure",
                "holds up phone showing he has been filming the scene",
                "addresses the crowd directly rallying them behind Saleem",
            ],
        ),
    ])
}

fn interventions() -> Vec<ScriptedEvent> {
    vec![
        ScriptedEvent {
            id: s("second_mobile"),
            narration: s("A second police mobile pulls up, lights on. Constable Raza stiffens; his superior is inside."),
            effect: s("Raza must act clean or lose his job. The bribe window slams shut."),
            knowledge: grants(&[(RAZA, "superior_officer_arrived_bribe_impossible")]),
        },
        ScriptedEvent {
            id: s("airline_gate"),
            narration: s("Ahmed's phone rings. The gate agent: 'Mr. Malik, boarding closes in twelve minutes.'"),
            effect: s("Ahmed's leverage collapses. He needs to leave now, not win."),
            knowledge: grants(&[(AHMED, "flight_closing_must_leave_immediately")]),
        },
        ScriptedEvent {
            id: s("crowd_recording"),
            narration: s("A teenager in the crowd raises his phone: 'Sab record ho raha hai, yeh live hai.' Three more phones go up."),
            effect: s("Bribe impossible on camera. Power shifts to Saleem."),
            knowledge: grants(&[
                (RAZA, "crowd_recording_bribe_impossible"),
                (AHMED, "cannot_threaten_on_camera"),
            ]),
        },
    ]
}

fn turning_points() -> Vec<ScriptedEvent> {
    vec![
        ScriptedEvent {
            id: s("airline_call"),
            narration: s("Ahmed's phone rings. The airline gate agent: 'Mr. Malik, boarding closes in eighteen minutes.'"),
            effect: s("Ahmed's leverage collapses. He needs to leave NOW, not win."),
            knowledge: grants(&[
                (AHMED, "flight_closing_call_received"),
                (RAZA, "ahmed_now_desperate_to_leave"),
            ]),
        },
        ScriptedEvent {
            id: s("crowd_recording"),
            narration: s("Three phones rise from the crowd simultaneously. Someone shouts: 'Sab record ho raha hai!'"),
            effect: s("Raza cannot take a bribe openly. Power shifts to Saleem."),
            knowledge: grants(&[
                (RAZA, "crowd_recording_bribe_impossible"),
                (AHMED, "cannot_threaten_on_camera"),
                (SALEEM, "crowd_is_on_my_side"),
            ]),
        },
        ScriptedEvent {
            id: s("dashcam_revealed"),
            narration: s("Uncle Jameel holds up his phone: shaky footage of the exact moment of impact, shot from his shop doorway."),
            effect: s("Footage shows Ahmed's car drifting into Saleem's lane. Fault is now visible."),
            knowledge: grants(&[
                (JAMEEL, "i_have_proof_of_what_happened"),
                (AHMED, "dashcam_shows_i_am_at_fault"),
                (SALEEM, "i_am_proven_innocent"),
            ]),
        },
    ]
}

fn clues() -> BTreeMap<HiddenTruth, ClueSet> {
    BTreeMap::from([
        (
            HiddenTruth::SaleemInnocent,
            clue_set(
                "A fresh white paint streak on the rickshaw sits well inside Saleem's lane.",
                "A shopkeeper mentions Ahmed was looking down at his phone as he turned.",
                "The traffic camera on the overpass has a clear angle on the intersection.",
            ),
        ),
        (
            HiddenTruth::AhmedStoleWallet,
            clue_set(
                "Ahmed keeps one hand on his briefcase and will not set it down.",
                "A corner of worn brown leather pokes out of the briefcase zipper.",
                "Uncle Jameel saw Ahmed lean into the rickshaw right after the crash.",
            ),
        ),
        (
            HiddenTruth::RazaCorrupt,
            clue_set(
                "Raza's citation book has no tickets written in it today, only phone numbers.",
                "A street vendor mutters that Raza takes 'chai pani' from every driver on this road.",
                "Jameel's nephew in the crowd has been filming Raza since he arrived.",
            ),
        ),
        (
            HiddenTruth::WalletNeverStolen,
            clue_set(
                "Something bulges under the torn cushion of the rickshaw's back seat.",
                "Saleem admits he shoved his wallet somewhere safe when the fares piled up.",
                "The rickshaw seat lifts up, and there is a gap beneath it wide enough for a wallet.",
            ),
        ),
        (
            HiddenTruth::UncleWitnessedBribe,
            clue_set(
                "Uncle Jameel goes quiet every time Raza speaks, watching his hands.",
                "Jameel mutters that this is not the first deal he has seen made on this corner.",
                "Jameel remembers the exact date Raza took money from a truck driver by his stall.",
            ),
        ),
    ])
}

fn clue_grants() -> BTreeMap<HiddenTruth, ClueGrants> {
    BTreeMap::from([
        (
            HiddenTruth::SaleemInnocent,
            ClueGrants {
                hint: grants(&[(SALEEM, "paint_streak_in_my_lane")]),
                evidence: grants(&[(JAMEEL, "ahmed_was_on_his_phone")]),
                weapon: grants(&[(JAMEEL, "traffic_camera_covers_intersection"), (SALEEM, "camera_can_clear_me")]),
            },
        ),
        (
            HiddenTruth::AhmedStoleWallet,
            ClueGrants {
                hint: grants(&[(JAMEEL, "ahmed_guards_briefcase")]),
                evidence: grants(&[(SALEEM, "wallet_visible_in_briefcase")]),
                weapon: grants(&[(JAMEEL, "saw_ahmed_reach_into_rickshaw"), (RAZA, "ahmed_may_be_a_thief")]),
            },
        ),
        (
            HiddenTruth::RazaCorrupt,
            ClueGrants {
                hint: grants(&[(AHMED, "citation_book_is_empty")]),
                evidence: grants(&[(SALEEM, "raza_takes_chai_pani")]),
                weapon: grants(&[(JAMEEL, "nephew_filming_raza"), (RAZA, "being_filmed")]),
            },
        ),
        (
            HiddenTruth::WalletNeverStolen,
            ClueGrants {
                hint: grants(&[(JAMEEL, "something_under_rickshaw_seat")]),
                evidence: grants(&[(SALEEM, "i_hid_my_wallet_somewhere")]),
                weapon: grants(&[(SALEEM, "wallet_under_the_seat"), (AHMED, "wallet_may_never_have_been_stolen")]),
            },
        ),
        (
            HiddenTruth::UncleWitnessedBribe,
            ClueGrants {
                hint: grants(&[(RAZA, "jameel_is_watching_me")]),
                evidence: grants(&[(AHMED, "jameel_has_seen_deals_here")]),
                weapon: grants(&[(JAMEEL, "i_saw_raza_take_a_bribe"), (SALEEM, "jameel_can_expose_raza")]),
            },
        ),
    ])
}

fn reveals() -> BTreeMap<HiddenTruth, String> {
    BTreeMap::from([
        (
            HiddenTruth::SaleemInnocent,
            s("Traffic camera footage later confirmed it: Ahmed's car had drifted lanes, clipping Saleem's rickshaw at the exact moment Ahmed glanced at his phone. \
               Saleem stood vindicated, though the damage to his livelihood remained. \
               Ahmed missed his flight, and the insurance claim would take months. \
               Uncle Jameel returned to his chai stall, satisfied that justice, however messy, had been served. \
               The crowd dispersed into the evening traffic, already forgetting the incident."),
        ),
        (
            HiddenTruth::AhmedStoleWallet,
            s("As Ahmed reached for his business card, Saleem's worn wallet tumbled from the briefcase onto the asphalt. \
               The crowd went silent, then erupted. Constable Raza had no choice but to detain Ahmed for questioning. \
               Saleem recovered his fifty thousand rupees, every note accounted for. \
               Ahmed's flight departed without him, and his explanation to the airline, and later his company, rang hollow. \
               The footage of the wallet falling went viral by morning."),
        ),
        (
            HiddenTruth::RazaCorrupt,
            s("Uncle Jameel's nephew, already in the crowd with a press card, had been filming Constable Raza since the beginning. \
               The footage aired that evening: Raza's whispered bribe negotiations, his hand extended toward Ahmed, the crowd's phones rising in unison. \
               By morning, Raza was suspended pending investigation. \
               Ahmed paid Saleem directly, settled the damages, and barely caught the last flight out. \
               Shahrah-e-Faisal returned to its usual chaos, but Uncle Jameel's chai stall became a minor landmark: the place where a corrupt cop finally got caught."),
        ),
        (
            HiddenTruth::WalletNeverStolen,
            s("Saleem's hand found the wallet wedged beneath the rickshaw seat; it had never left. \
               Relief and embarrassment crossed his face simultaneously as he pulled out the familiar worn leather. \
               Ahmed's impatience evaporated into exasperation; he'd missed his flight for nothing. \
               Constable Raza pocketed his citation book, muttering about wasted time. \
               The crowd dispersed, disappointed by the anticlimactic ending, as Karachi traffic swallowed them all."),
        ),
        (
            HiddenTruth::UncleWitnessedBribe,
            s("Uncle Jameel finally stepped forward: 'I saw Raza take money here three weeks ago from a truck driver. I have been waiting for a reason to say so.' \
               The crowd turned on Constable Raza, who paled and began backing toward his motorcycle. \
               Ahmed seized the opportunity, paid Saleem a quick settlement, and fled toward the airport. \
               Raza's supervisor arrived within minutes; someone in the crowd had already called. \
               Uncle Jameel returned to his stall, vindicated, as the evening call to prayer echoed across the city."),
        ),
    ])
}

fn props() -> Vec<PropSeed> {
    let prop = |name: &str, owner: &str, patch: EntityPatch| PropSeed {
        name: s(name),
        owner: s(owner),
        patch,
    };
    vec![
        prop(
            "wallet",
            SALEEM,
            EntityPatch::status("missing").with("value", "50000 rupees"),
        ),
        prop("rickshaw", SALEEM, EntityPatch::status("damaged")),
        prop(
            "car",
            AHMED,
            EntityPatch::status("scratched").with("model", "white Corolla"),
        ),
        prop("briefcase", AHMED, EntityPatch::status("closed")),
        prop("citation_book", RAZA, EntityPatch::status("in_hand")),
        prop("phone", JAMEEL, EntityPatch::status("recording")),
    ]
}
