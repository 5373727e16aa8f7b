//! Built-in content for a participant session: the conference script, the
//! notification pool, the demo walkthrough and the assistant's replies.

use crate::chat::{ChatScript, ReplyRule, ScriptedBranch};
use crate::models::{
    ContentBlock, Document, NotificationKind, NotificationTemplate, Participant, ScriptLine,
};

/// Id of the seeded engagement plan the walkthrough points at
pub const REFERENCE_DOCUMENT_ID: &str = "doc-rencana-engagement";

/// Phrase that starts the assistant's scripted branch
pub const TRIGGER_PHRASE: &str = "Saya tidak punya ide";

#[derive(Debug, Clone)]
pub struct Catalog {
    pub script: Vec<ScriptLine>,
    pub roster: Vec<Participant>,
    pub notification_pool: Vec<NotificationTemplate>,
    pub demo_sequence: Vec<NotificationTemplate>,
    pub chat: ChatScript,
    /// Read-only document every session can open
    pub reference_document: Document,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            script: conference_script(),
            roster: roster(),
            notification_pool: notification_pool(),
            demo_sequence: demo_sequence(),
            chat: chat_script(),
            reference_document: reference_document(),
        }
    }

    /// Same content with a different conference script
    pub fn with_script(mut self, script: Vec<ScriptLine>) -> Self {
        self.script = script;
        self
    }

    /// Step-1 demo notification, whose viewing is remembered
    pub fn follow_up_demo(&self) -> Option<&NotificationTemplate> {
        self.demo_sequence.get(1)
    }
}

fn roster() -> Vec<Participant> {
    vec![
        Participant::new("rina", "Rina Wijaya", "Manajer HR"),
        Participant::new("budi", "Budi Santoso", "Kepala Divisi Operasional"),
        Participant::new("sari", "Sari Putri", "Spesialis Engagement"),
        Participant::new("peserta", "Anda", "Peserta"),
    ]
}

fn conference_script() -> Vec<ScriptLine> {
    vec![
        ScriptLine::new(
            "rina",
            "Rina Wijaya",
            "Selamat pagi semuanya. Terima kasih sudah bergabung di rapat ini.",
        ),
        ScriptLine::new(
            "budi",
            "Budi Santoso",
            "Hasil survei terakhir menunjukkan skor engagement tim operasional turun 12 persen.",
        ),
        ScriptLine::new(
            "sari",
            "Sari Putri",
            "Banyak karyawan merasa kurang diakui dan jarang mendapat umpan balik.",
        ),
        ScriptLine::new(
            "rina",
            "Rina Wijaya",
            "Kami ingin Anda menyusun rencana program engagement untuk kuartal depan.",
        ),
        ScriptLine::new(
            "budi",
            "Budi Santoso",
            "Tolong kirimkan draf rencananya lewat email sebelum akhir minggu.",
        ),
    ]
}

fn notification_pool() -> Vec<NotificationTemplate> {
    vec![
        NotificationTemplate::new(
            NotificationKind::Email,
            "Email baru dari Rina Wijaya",
            "Hasil survei engagement kuartal ini sudah tersedia.",
        )
        .link("/participant/email"),
        NotificationTemplate::new(
            NotificationKind::Task,
            "Tugas baru",
            "Susun rencana program engagement untuk tim operasional.",
        )
        .link("/participant/documents"),
        NotificationTemplate::new(
            NotificationKind::Chat,
            "Pesan dari Budi Santoso",
            "Jangan lupa pertimbangkan anggaran yang terbatas.",
        )
        .link("/participant/chat"),
        NotificationTemplate::new(
            NotificationKind::Task,
            "Rapat dimulai",
            "Rapat koordinasi engagement sedang berlangsung.",
        )
        .link("/participant/conference")
        .on_route("/participant/email"),
    ]
}

fn demo_sequence() -> Vec<NotificationTemplate> {
    vec![
        NotificationTemplate::new(
            NotificationKind::Email,
            "Rencana engagement",
            "Baca dokumen rencana engagement sebelum rapat berikutnya.",
        )
        .link(format!("/participant/documents/{}", REFERENCE_DOCUMENT_ID)),
        NotificationTemplate::new(
            NotificationKind::Chat,
            "Asisten siap membantu",
            "Masih bingung memilih program? Tanyakan pada asisten.",
        )
        .link("/participant/chat"),
    ]
}

fn chat_script() -> ChatScript {
    ChatScript {
        rules: vec![
            ReplyRule::new(
                "ringkasan",
                vec![
                    ContentBlock::heading(3, "Ringkasan"),
                    ContentBlock::bullets([
                        "Skor engagement tim operasional turun 12 persen.",
                        "Keluhan utama: kurang pengakuan dan umpan balik.",
                        "Rencana program dibutuhkan untuk kuartal depan.",
                    ]),
                ],
            ),
            ReplyRule::new(
                "cari",
                vec![
                    ContentBlock::paragraph("Saya menemukan dokumen yang relevan:"),
                    ContentBlock::bullets(["Rencana engagement", "Hasil survei kuartal III"]),
                ],
            ),
            ReplyRule::new(
                "jelaskan",
                vec![ContentBlock::paragraph(
                    "Engagement karyawan adalah tingkat keterlibatan dan komitmen \
                     karyawan terhadap pekerjaan dan organisasinya.",
                )],
            ),
        ],
        fallbacks: vec![
            vec![ContentBlock::paragraph(
                "Menarik! Bisa ceritakan lebih lanjut apa yang Anda butuhkan?",
            )],
            vec![ContentBlock::paragraph(
                "Saya bisa membuat ringkasan, mencari dokumen, atau menjelaskan istilah.",
            )],
            vec![ContentBlock::paragraph(
                "Maaf, saya belum memahami pertanyaan Anda. Coba kata kunci lain.",
            )],
        ],
        branch: Some(ScriptedBranch {
            trigger_phrase: TRIGGER_PHRASE.to_string(),
            document_id: Some(REFERENCE_DOCUMENT_ID.to_string()),
            first: vec![ContentBlock::paragraph(
                "Tidak apa-apa. Mari mulai dari masalah yang disebutkan di rapat.",
            )],
            second: vec![
                ContentBlock::paragraph("Berikut beberapa opsi program yang bisa dipertimbangkan:"),
                ContentBlock::table(
                    &["Opsi", "Biaya", "Dampak"],
                    &[
                        &["Program apresiasi bulanan", "Rendah", "Sedang"],
                        &["Sesi umpan balik 1:1", "Rendah", "Tinggi"],
                        &["Pelatihan kepemimpinan", "Tinggi", "Tinggi"],
                    ],
                ),
            ],
            notification: NotificationTemplate::new(
                NotificationKind::Chat,
                "Asisten",
                "Asisten mengirim beberapa opsi program.",
            )
            .link("/participant/chat"),
        }),
    }
}

fn reference_document() -> Document {
    let mut document = Document::new(
        "Rencana Engagement Tim Operasional",
        vec![
            ContentBlock::heading(1, "Rencana Engagement Tim Operasional"),
            ContentBlock::paragraph(
                "Dokumen ini merangkum temuan survei dan arah program engagement.",
            ),
            ContentBlock::heading(2, "Temuan"),
            ContentBlock::numbered([
                "Skor engagement turun dari 72 menjadi 60.",
                "Karyawan jarang menerima umpan balik.",
            ]),
            ContentBlock::heading(2, "Langkah berikutnya"),
            ContentBlock::paragraph("Pilih satu atau lebih program dan jelaskan alasannya."),
        ],
    );
    document.id = REFERENCE_DOCUMENT_ID.to_string();
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trigger;

    #[test]
    fn test_builtin_speakers_are_on_roster() {
        let catalog = Catalog::builtin();
        for line in &catalog.script {
            assert!(catalog.roster.iter().any(|p| p.id == line.speaker_id));
        }
    }

    #[test]
    fn test_builtin_pool_has_route_trigger() {
        let catalog = Catalog::builtin();
        assert!(catalog
            .notification_pool
            .iter()
            .any(|t| matches!(t.trigger, Trigger::Route { .. })));
        assert_eq!(catalog.demo_sequence.len(), 2);
    }

    #[test]
    fn test_branch_points_at_reference_document() {
        let catalog = Catalog::builtin();
        let branch = catalog.chat.branch.as_ref().unwrap();
        assert_eq!(branch.document_id.as_deref(), Some(catalog.reference_document.id.as_str()));
        assert_eq!(branch.trigger_phrase, TRIGGER_PHRASE);
    }
}
