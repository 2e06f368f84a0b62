mod seeding;
